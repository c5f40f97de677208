use std::sync::{Arc, Mutex};

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::{self, Next},
    response::Response,
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::auth::claims::Claims;
use crate::state::AppState;

/// One request line seen by the stub.
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: String,
    pub uri: String,
    pub authorized: bool,
}

type Hits = Arc<Mutex<Vec<Hit>>>;

/// In-process backend on an ephemeral port. Routes come from the test;
/// every request that reaches them is recorded.
pub struct StubBackend {
    pub base_url: String,
    hits: Hits,
}

impl StubBackend {
    pub async fn spawn(router: Router) -> Self {
        let hits = Hits::default();
        let app = router
            .layer(middleware::from_fn_with_state(hits.clone(), record))
            .layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server");
        });
        Self {
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().expect("hits lock").clone()
    }

    /// Fresh state with an empty session pointed at this stub.
    pub fn state(&self) -> AppState {
        AppState::fake(&self.base_url)
    }

    pub fn signed_in_state(&self, role: &str) -> AppState {
        let st = self.state();
        st.session.sign_in(token_for(role)).expect("sign in");
        st
    }
}

async fn record(State(hits): State<Hits>, req: Request, next: Next) -> Response {
    hits.lock().expect("hits lock").push(Hit {
        method: req.method().to_string(),
        uri: req.uri().to_string(),
        authorized: req.headers().contains_key(AUTHORIZATION),
    });
    next.run(req).await
}

/// A token shaped like the backend's, signed with a throwaway secret.
pub fn token_for(role: &str) -> String {
    let claims = Claims {
        user_id: Some(1),
        role: Some(role.to_string()),
        exp: Some(4_102_444_800),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"stub-secret"),
    )
    .expect("sign token")
}
