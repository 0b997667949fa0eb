use rdiscover::{Discoverer, MultipleUpstreamDiscoverer};
use std::sync::Arc;
use test_utils::{test_resource, StaticDiscoverer};
use tokio_util::sync::CancellationToken;


#[tokio::test]
async fn test_merges_resources_errors_and_warnings() {
    let composite = MultipleUpstreamDiscoverer::new()
        .with_id("fleet")
        .with_upstream(Arc::new(StaticDiscoverer::new(
            "child_a",
            vec![test_resource(1), test_resource(2)],
        )))
        .with_upstream(Arc::new(
            StaticDiscoverer::new("child_b", Vec::new())
                .with_errors(vec!["failed to authenticate".to_string()]),
        ))
        .with_upstream(Arc::new(
            StaticDiscoverer::new("child_c", vec![test_resource(3)])
                .with_warnings(vec!["one malformed record skipped".to_string()]),
        ));

    let result = composite.discover(CancellationToken::new()).await;

    assert_eq!(result.metadata().discoverer_id, "fleet");
    assert!(result.metadata().ended_at.is_some());
    assert_eq!(result.resources().len(), 3);

    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0], "child_b: failed to authenticate");

    let warnings = result.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0], "child_c: one malformed record skipped");
}

#[tokio::test]
async fn test_composites_nest() {
    let inner = MultipleUpstreamDiscoverer::new()
        .with_id("inner")
        .with_upstream(Arc::new(StaticDiscoverer::new(
            "leaf_a",
            vec![test_resource(1)],
        )))
        .with_upstream(Arc::new(
            StaticDiscoverer::new("leaf_b", Vec::new()).with_errors(vec!["boom".to_string()]),
        ));

    let outer = MultipleUpstreamDiscoverer::new()
        .with_id("outer")
        .with_upstream(Arc::new(inner))
        .with_upstream(Arc::new(StaticDiscoverer::new(
            "leaf_c",
            vec![test_resource(2)],
        )));

    let result = outer.discover(CancellationToken::new()).await;

    assert_eq!(result.metadata().discoverer_id, "outer");
    assert_eq!(result.resources().len(), 2);
    // the inner composite's attribution is preserved in the outer merge
    assert_eq!(result.errors(), vec!["inner: leaf_b: boom".to_string()]);
}

#[tokio::test]
async fn test_empty_composite_returns_empty_result() {
    let composite = MultipleUpstreamDiscoverer::new();
    let result = composite.discover(CancellationToken::new()).await;
    assert!(result.resources().is_empty());
    assert!(!result.has_errors());
    assert!(result.metadata().ended_at.is_some());
}
