use super::*;
use crate::testing::StaticRetriever;

#[test]
fn static_router_returns_all_retrievers_in_order() {
    let pdf: Arc<dyn ContentRetriever> = Arc::new(StaticRetriever::new("pdf", &[]));
    let web: Arc<dyn ContentRetriever> = Arc::new(StaticRetriever::new("web", &[]));
    let router = StaticRouter::new(vec![Arc::clone(&pdf), Arc::clone(&web)]);

    for query in ["bonjour", "", "recette de crêpes"] {
        let routed = router.route(query).expect("static routing never fails");
        let names: Vec<&str> = routed.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["pdf", "web"]);
        assert!(Arc::ptr_eq(&routed[0], &pdf));
    }
}

#[test]
fn static_router_with_no_retrievers_routes_nowhere() {
    let router = StaticRouter::new(Vec::new());
    assert!(router.route("bonjour").expect("routing succeeds").is_empty());
}
