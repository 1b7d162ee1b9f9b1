use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use pathwise::{HttpMethod, RouteDeclaration, RouterBuilder};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_router_resolves_across_tasks() {
    let calls = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&calls);

    let mut builder = RouterBuilder::new();
    builder
        .add_routes([
            RouteDeclaration::literal([HttpMethod::Get], "/ping", 0usize),
            RouteDeclaration::variable([HttpMethod::Get], "/items/{id}", 1),
            RouteDeclaration::pattern([HttpMethod::Get], "/blobs/(.+)", 2),
        ])
        .unwrap()
        .add_alias("/v1", "/")
        .unwrap()
        .observer(move |_nanos: u64| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
    let router = Arc::new(builder.build().unwrap());

    let mut tasks = Vec::new();
    for task in 0..16usize {
        let router = Arc::clone(&router);
        tasks.push(tokio::spawn(async move {
            for i in 0..100usize {
                let id = task * 100 + i;
                let found = router.resolve(HttpMethod::Get, "/ping").unwrap().unwrap();
                assert_eq!(*found.handler(), 0);

                let path = format!("/v1/items/{id}");
                let found = router.resolve(HttpMethod::Get, &path).unwrap().unwrap();
                assert_eq!(*found.handler(), 1);
                assert_eq!(found.param("id"), Some(id.to_string().as_str()));

                let path = format!("/blobs/{task}/{i}");
                let found = router.resolve(HttpMethod::Get, &path).unwrap().unwrap();
                assert_eq!(found.group(1), Some(format!("{task}/{i}").as_str()));

                assert!(router.resolve(HttpMethod::Post, "/ping").unwrap().is_none());
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(calls.load(Ordering::Relaxed), 16 * 100 * 4);
}
