use super::*;
use std::cell::RefCell;

struct EchoModel {
    prompts: RefCell<Vec<Vec<ChatMessage>>>,
}

impl ChatModel for EchoModel {
    fn chat(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        self.prompts.borrow_mut().push(messages.to_vec());
        Ok(messages
            .last()
            .map(|m| m.text.clone())
            .unwrap_or_default())
    }
}

#[test]
fn template_substitutes_placeholders() {
    let template = PromptTemplate::new("Question : '{{question}}' ({{question}})");
    let prompt = template.apply(&HashMap::from([("question", "le RAG ?")]));
    assert_eq!(prompt, "Question : 'le RAG ?' (le RAG ?)");
}

#[test]
fn template_keeps_unknown_placeholders() {
    let template = PromptTemplate::new("{{options}} / {{query}}");
    let prompt = template.apply(&HashMap::from([("query", "pâtes")]));
    assert_eq!(prompt, "{{options}} / pâtes");
}

#[test]
fn inserted_values_are_not_rescanned() {
    let template = PromptTemplate::new("O:{{options}} Q:{{query}}");
    let variables = HashMap::from([("options", "1: ia"), ("query", "dis {{options}}")]);

    for _ in 0..50 {
        assert_eq!(template.apply(&variables), "O:1: ia Q:dis {{options}}");
    }
}

#[test]
fn template_handles_unbalanced_braces() {
    let template = PromptTemplate::new("{{ {{query}} }} {{query");
    let prompt = template.apply(&HashMap::from([("query", "q")]));
    assert_eq!(prompt, "{{ q }} {{query");
}

#[test]
fn ask_sends_a_single_user_message() {
    let model = EchoModel {
        prompts: RefCell::new(Vec::new()),
    };

    let reply = model.ask("oui ou non ?").expect("echo never fails");

    assert_eq!(reply, "oui ou non ?");
    assert_eq!(
        model.prompts.borrow().as_slice(),
        &[vec![ChatMessage::user("oui ou non ?")]]
    );
}
