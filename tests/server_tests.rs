use std::collections::BTreeSet;

use prefix_trie::protocol::{Request, Response};
use prefix_trie::{Client, ClientError, PrefixTree, Server, MAX_KEY_LENGTH};

/// Starts a server on an ephemeral port and returns its address
async fn start_server() -> String {
    serve(Server::new()).await
}

async fn serve(server: Server) -> String {
    let listener = Server::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        server.serve(listener).await.unwrap();
    });

    addr
}

/// `count` distinct keys of the longest allowed length
fn long_keys(count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| {
            let mut key = format!("{:05}", i).into_bytes();
            key.resize(MAX_KEY_LENGTH - 1, b'x');
            key
        })
        .collect()
}

fn set(keys: Vec<Vec<u8>>) -> BTreeSet<Vec<u8>> {
    keys.into_iter().collect()
}

#[tokio::test]
async fn test_client_scenario() {
    let addr = start_server().await;
    let mut client = Client::connect(addr.as_str()).await.unwrap();

    assert!(client.insert("foo").await.unwrap());
    assert!(client.insert("fo").await.unwrap());
    assert!(client.insert("bar").await.unwrap());
    assert!(!client.insert("bar").await.unwrap());

    assert_eq!(client.size().await.unwrap(), 3);
    assert_eq!(
        set(client.complete("fo").await.unwrap()),
        set(vec![b"fo".to_vec(), b"foo".to_vec()])
    );
    assert!(client.complete("zz").await.unwrap().is_empty());

    assert!(client.delete("fo").await.unwrap());
    assert!(!client.exists("fo").await.unwrap());
    assert!(client.exists("foo").await.unwrap());
    assert!(!client.delete("xyz").await.unwrap());

    assert!(client.reset().await.unwrap());
    assert!(client.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clients_share_one_tree() {
    let addr = start_server().await;
    let mut first = Client::connect(addr.as_str()).await.unwrap();
    let mut second = Client::connect(addr.as_str()).await.unwrap();

    first.insert("shared").await.unwrap();
    assert!(second.exists("shared").await.unwrap());
    assert!(!second.insert("shared").await.unwrap());
}

#[tokio::test]
async fn test_key_too_long_keeps_connection() {
    let addr = start_server().await;
    let mut client = Client::connect(addr.as_str()).await.unwrap();

    let long = vec![b'x'; MAX_KEY_LENGTH];
    match client.insert(&long).await {
        Err(ClientError::Server(msg)) => assert!(msg.contains("too long")),
        other => panic!("unexpected result {:?}", other),
    }

    // raw requests see the error response itself
    assert!(matches!(
        client.request(Request::Exists(long)).await.unwrap(),
        Response::Error(_)
    ));

    assert_eq!(client.size().await.unwrap(), 0);
    assert!(client.insert("ok").await.unwrap());
}

#[tokio::test]
async fn test_many_concurrent_clients() {
    let addr = start_server().await;

    let mut handles = Vec::new();
    for i in 0..8u8 {
        let addr = addr.clone();
        handles.push(tokio::spawn(async move {
            let mut client = Client::connect(addr.as_str()).await.unwrap();
            for j in 0..25u8 {
                client.insert([b'k', i, j]).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut client = Client::connect(addr.as_str()).await.unwrap();
    assert_eq!(client.size().await.unwrap(), 8 * 25);
    assert_eq!(client.complete([b'k', 3]).await.unwrap().len(), 25);
}

#[tokio::test]
async fn test_large_listing_is_delivered() {
    // well over a mebibyte of keys
    let tree: PrefixTree = long_keys(5000).into_iter().collect();
    let addr = serve(Server::with_tree(tree)).await;
    let mut client = Client::connect(addr.as_str()).await.unwrap();

    assert_eq!(client.size().await.unwrap(), 5000);
    assert_eq!(client.keys().await.unwrap().len(), 5000);
    assert_eq!(client.complete("0").await.unwrap().len(), 5000);
    assert_eq!(client.size().await.unwrap(), 5000);
}

#[tokio::test]
async fn test_oversized_listing_keeps_connection() {
    let tree: PrefixTree = long_keys(500).into_iter().collect();
    let addr = serve(Server::with_frame_limit(tree, 64 * 1024)).await;
    let mut client = Client::connect(addr.as_str()).await.unwrap();

    match client.keys().await {
        Err(ClientError::Server(msg)) => assert!(msg.starts_with("response too large")),
        other => panic!("unexpected result {:?}", other.map(|keys| keys.len())),
    }

    // the same connection still answers, including small listings
    assert_eq!(client.size().await.unwrap(), 500);
    assert_eq!(client.complete("00042").await.unwrap().len(), 1);
    assert!(client.insert("short").await.unwrap());
}
