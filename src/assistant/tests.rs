use super::*;
use crate::chat::Role;
use crate::retrieval::ContentRetriever;
use crate::router::{GateRouter, MaybePolicy, StaticRouter};
use crate::testing::{ScriptedChatModel, StaticRetriever};
use std::io::Cursor;

fn assistant_with(
    model: &Arc<ScriptedChatModel>,
    contents: &[&str],
    max_messages: usize,
) -> Assistant {
    let retriever: Arc<dyn ContentRetriever> = Arc::new(StaticRetriever::new("ia", contents));
    let augmentor = RetrievalAugmentor::new(Arc::new(StaticRouter::new(vec![retriever])));
    Assistant::new(
        Arc::clone(model) as Arc<dyn ChatModel>,
        augmentor,
        MessageWindowMemory::with_max_messages(max_messages),
    )
}

fn run(assistant: &mut Assistant, input: &str) -> (usize, String) {
    let mut output = Vec::new();
    let answered =
        run_repl(assistant, Cursor::new(input.to_string()), &mut output).expect("repl should run");
    (
        answered,
        String::from_utf8(output).expect("output should be utf-8"),
    )
}

#[test]
fn state_transitions() {
    let state = ReplState::AwaitingInput;
    assert_eq!(
        state.next(Some("fin\n")),
        (ReplState::Terminated, ReplAction::Stop)
    );
    assert_eq!(
        state.next(Some("  FIN ")),
        (ReplState::Terminated, ReplAction::Stop)
    );
    assert_eq!(
        state.next(Some("   \n")),
        (ReplState::AwaitingInput, ReplAction::Skip)
    );
    assert_eq!(
        state.next(Some(" bonjour \n")),
        (ReplState::AwaitingInput, ReplAction::Ask("bonjour".to_string()))
    );
    assert_eq!(state.next(None), (ReplState::Terminated, ReplAction::Stop));
    assert_eq!(
        ReplState::Terminated.next(Some("bonjour")),
        (ReplState::Terminated, ReplAction::Stop)
    );
}

#[test]
fn stop_word_must_match_whole_input() {
    assert!(matches!(
        ReplState::AwaitingInput.next(Some("fin du film ?")),
        (ReplState::AwaitingInput, ReplAction::Ask(_))
    ));
}

#[test]
fn one_question_then_fin_makes_one_call() {
    let model = Arc::new(ScriptedChatModel::new(["Bonjour ! Comment puis-je aider ?"]));
    let mut assistant = assistant_with(&model, &[], 10);

    let (answered, output) = run(&mut assistant, "bonjour\nfin\n");

    assert_eq!(answered, 1);
    assert_eq!(model.call_count(), 1);
    assert!(output.contains("Assistant : Bonjour ! Comment puis-je aider ?"));
    assert_eq!(output.matches(PROMPT).count(), 2);
}

#[test]
fn blank_lines_are_skipped() {
    let model = Arc::new(ScriptedChatModel::new(Vec::<String>::new()));
    let mut assistant = assistant_with(&model, &[], 10);

    let (answered, output) = run(&mut assistant, "\n   \nfin\n");

    assert_eq!(answered, 0);
    assert_eq!(model.call_count(), 0);
    assert!(assistant.memory().is_empty());
    assert_eq!(output.matches(PROMPT).count(), 3);
}

#[test]
fn end_of_input_stops_the_loop() {
    let model = Arc::new(ScriptedChatModel::new(["réponse"]));
    let mut assistant = assistant_with(&model, &[], 10);

    let (answered, _) = run(&mut assistant, "une question");

    assert_eq!(answered, 1);
    assert_eq!(model.call_count(), 1);
}

#[test]
fn model_errors_end_the_loop() {
    let model = Arc::new(ScriptedChatModel::failing("HTTP 500"));
    let mut assistant = assistant_with(&model, &[], 10);

    let result = run_repl(
        &mut assistant,
        Cursor::new("bonjour\nfin\n".to_string()),
        Vec::new(),
    );

    assert!(result.is_err());
}

#[test]
fn memory_keeps_the_raw_question() {
    let model = Arc::new(ScriptedChatModel::new(["Le RAG combine recherche et génération."]));
    let mut assistant = assistant_with(&model, &["Le RAG est une technique."], 10);

    assistant
        .chat("Qu'est-ce que le RAG ?")
        .expect("chat should succeed");

    let sent = model.last_call();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.starts_with("Qu'est-ce que le RAG ?\n\n"));
    assert!(sent[0].text.contains("Le RAG est une technique."));

    let remembered = assistant.memory().messages();
    assert_eq!(remembered.len(), 2);
    assert_eq!(remembered[0], ChatMessage::user("Qu'est-ce que le RAG ?"));
    assert_eq!(remembered[1].role, Role::Assistant);
}

#[test]
fn history_is_sent_with_each_question() {
    let model = Arc::new(ScriptedChatModel::new(["r1", "r2"]));
    let mut assistant = assistant_with(&model, &[], 10);

    assistant.chat("q1").expect("first chat should succeed");
    assistant.chat("q2").expect("second chat should succeed");

    let sent = model.last_call();
    let texts: Vec<&str> = sent.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["q1", "r1", "q2"]);
}

#[test]
fn memory_window_evicts_oldest() {
    let model = Arc::new(ScriptedChatModel::new(["r1", "r2", "r3"]));
    let mut assistant = assistant_with(&model, &[], 4);

    for question in ["q1", "q2", "q3"] {
        assistant.chat(question).expect("chat should succeed");
    }

    let texts: Vec<String> = assistant
        .memory()
        .messages()
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(texts, vec!["q2", "r2", "q3", "r3"]);
    // q1 was already evicted when the third request was sent
    let sent: Vec<String> = model.last_call().into_iter().map(|m| m.text).collect();
    assert_eq!(sent, vec!["r1", "q2", "r2", "q3"]);
}

#[test]
fn gated_question_skips_retrieval_but_still_answers() {
    let model = Arc::new(ScriptedChatModel::new(["non", "Lima."]));
    let retriever = Arc::new(StaticRetriever::new("ia", &["contexte IA"]));
    let router = GateRouter::new(
        Arc::clone(&model) as Arc<dyn ChatModel>,
        Arc::clone(&retriever) as Arc<dyn ContentRetriever>,
        MaybePolicy::Retrieve,
    );
    let mut assistant = Assistant::new(
        Arc::clone(&model) as Arc<dyn ChatModel>,
        RetrievalAugmentor::new(Arc::new(router)),
        MessageWindowMemory::with_max_messages(10),
    );

    let reply = assistant
        .chat("Capitale du Pérou ?")
        .expect("chat should succeed");

    assert_eq!(reply, "Lima.");
    assert_eq!(model.call_count(), 2);
    assert_eq!(model.last_call()[0].text, "Capitale du Pérou ?");
    assert!(retriever.calls.borrow().is_empty());
}
