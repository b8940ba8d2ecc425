#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use forum_service::config::ForumConfig;
use forum_service::grpc::proto::forum_service_client::ForumServiceClient;
use forum_service::grpc::proto::*;
use forum_service::{grpc_service, in_memory_state, AppState};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Channel, Server};

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
}

impl TestServer {
    pub async fn client(&self) -> ForumServiceClient<Channel> {
        ForumServiceClient::connect(format!("http://{}", self.addr))
            .await
            .expect("connect to in-process forum server")
    }
}

/// Serve an in-memory forum on an ephemeral local port.
pub async fn spawn_server(limits: ForumConfig) -> TestServer {
    let state = Arc::new(in_memory_state(limits));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let incoming = TcpListenerStream::new(listener);

    let service = grpc_service(state.clone());
    tokio::spawn(async move {
        Server::builder()
            .add_service(service)
            .serve_with_incoming(incoming)
            .await
            .expect("forum server");
    });

    TestServer { addr, state }
}

pub async fn create_post(client: &mut ForumServiceClient<Channel>, title: &str) -> Post {
    client
        .create_post(CreatePostRequest {
            title: title.to_string(),
            text: format!("{} body", title),
            image_url: Some("https://img.example/cat.png".into()),
            video_url: None,
            author: "alice".into(),
            subreddit_id: None,
            tags: vec![],
        })
        .await
        .expect("create post")
        .into_inner()
        .post
        .expect("post in response")
}

pub async fn comment_on_post(
    client: &mut ForumServiceClient<Channel>,
    post_id: &str,
    text: &str,
) -> Comment {
    create_comment(client, Some(post_id), None, text).await
}

pub async fn reply_to(
    client: &mut ForumServiceClient<Channel>,
    comment_id: &str,
    text: &str,
) -> Comment {
    create_comment(client, None, Some(comment_id), text).await
}

async fn create_comment(
    client: &mut ForumServiceClient<Channel>,
    parent_post_id: Option<&str>,
    parent_comment_id: Option<&str>,
    text: &str,
) -> Comment {
    client
        .create_comment(CreateCommentRequest {
            text: text.to_string(),
            author: "bob".into(),
            parent_post_id: parent_post_id.map(str::to_string),
            parent_comment_id: parent_comment_id.map(str::to_string),
        })
        .await
        .expect("create comment")
        .into_inner()
        .comment
        .expect("comment in response")
}

pub async fn vote_comment_times(
    client: &mut ForumServiceClient<Channel>,
    comment_id: &str,
    upvotes: usize,
) {
    for _ in 0..upvotes {
        client
            .vote_comment(VoteCommentRequest {
                comment_id: comment_id.to_string(),
                upvote: true,
            })
            .await
            .expect("vote comment");
    }
}

pub fn ids(comments: &[Comment]) -> Vec<String> {
    comments.iter().map(|c| c.comment_id.clone()).collect()
}
