use std::sync::Arc;

use gallery_block::dispatch;
use gallery_shared::discord::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use gallery_shared::discord::{Interaction, InteractionKind, InteractionResponse, SignatureError};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};

use crate::app_state::AppState;

fn json_response(status: StatusCode, body: String) -> Result<Response<Body>, Error> {
    let resp = Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(body.into())
        .map_err(Box::new)?;
    Ok(resp)
}

fn header<'a>(event: &'a Request, name: &str) -> Option<&'a str> {
    event.headers().get(name).and_then(|v| v.to_str().ok())
}

fn error_response(status: StatusCode, message: &str) -> Result<Response<Body>, Error> {
    json_response(status, serde_json::json!({ "error": message }).to_string())
}

/// Main Lambda handler - verifies, parses and answers one interaction
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    tracing::info!(
        "Interactions Lambda invoked - Method: {} Path: {}",
        method,
        event.uri().path()
    );

    if method != Method::POST {
        return error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }

    let body: &[u8] = event.body().as_ref();

    let verified = match (header(&event, SIGNATURE_HEADER), header(&event, TIMESTAMP_HEADER)) {
        (Some(signature), Some(timestamp)) => state.verifier.verify(signature, timestamp, body),
        _ => Err(SignatureError::MalformedSignature),
    };
    if let Err(e) = verified {
        tracing::warn!("Rejected interaction request: {}", e);
        return error_response(StatusCode::UNAUTHORIZED, "invalid request signature");
    }

    let interaction: Interaction = match serde_json::from_slice(body) {
        Ok(interaction) => interaction,
        Err(e) => {
            tracing::warn!("Unparseable interaction body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "invalid interaction body");
        }
    };

    let response = match interaction.kind() {
        InteractionKind::Ping => InteractionResponse::pong(),
        _ => dispatch(&state.gallery, &interaction).await,
    };

    json_response(StatusCode::OK, serde_json::to_string(&response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ed25519_dalek::{Signer, SigningKey};
    use gallery_atoms::galleries::{GalleryStore, MemoryDocuments};
    use gallery_block::{GalleryContext, PromptSigner};
    use gallery_shared::discord::{
        ApplicationCommand, CommandRegistrar, RegistrarError, SignatureVerifier,
    };
    use serde_json::{json, Value};

    struct NoopRegistrar;

    #[async_trait]
    impl CommandRegistrar for NoopRegistrar {
        async fn overwrite_commands(&self, _: &[ApplicationCommand]) -> Result<(), RegistrarError> {
            Ok(())
        }
    }

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[3u8; 32])
    }

    fn state() -> Arc<AppState> {
        let public = hex::encode(signing_key().verifying_key().to_bytes());
        let gallery = GalleryContext::new(
            GalleryStore::new(Arc::new(MemoryDocuments::default())),
            Arc::new(NoopRegistrar),
            PromptSigner::new("secret"),
        );
        Arc::new(AppState::new(
            SignatureVerifier::from_hex(&public).expect("verifier"),
            gallery,
        ))
    }

    fn signed_request(body: &Value) -> Request {
        let body = body.to_string();
        let timestamp = "1700000000";
        let signature = signing_key().sign(format!("{timestamp}{body}").as_bytes());
        lambda_http::http::Request::builder()
            .method("POST")
            .uri("/interactions")
            .header(SIGNATURE_HEADER, hex::encode(signature.to_bytes()))
            .header(TIMESTAMP_HEADER, timestamp)
            .body(Body::from(body))
            .expect("request")
    }

    fn json_body(response: &Response<Body>) -> Value {
        serde_json::from_slice(response.body().as_ref()).expect("json body")
    }

    #[tokio::test]
    async fn ping_is_answered_with_pong() {
        let response = function_handler(signed_request(&json!({ "id": "1", "type": 1 })), state())
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(&response), json!({ "type": 1 }));
    }

    #[tokio::test]
    async fn bad_signature_is_unauthorized() {
        let mut request = signed_request(&json!({ "id": "1", "type": 1 }));
        request
            .headers_mut()
            .insert(TIMESTAMP_HEADER, "1700000001".parse().expect("header"));
        let response = function_handler(request, state()).await.expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let unsigned = lambda_http::http::Request::builder()
            .method("POST")
            .uri("/interactions")
            .body(Body::from("{}"))
            .expect("request");
        let response = function_handler(unsigned, state()).await.expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_post_and_garbage_bodies_are_refused() {
        let get = lambda_http::http::Request::builder()
            .method("GET")
            .uri("/interactions")
            .body(Body::Empty)
            .expect("request");
        let response = function_handler(get, state()).await.expect("response");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = function_handler(signed_request(&json!({ "nonsense": true })), state())
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn commands_are_dispatched_to_the_gallery_block() {
        let state = state();
        let create = json!({
            "id": "2",
            "type": 2,
            "token": "tok",
            "member": { "user": { "id": "42" } },
            "data": {
                "name": "gallery",
                "options": [{
                    "name": "create",
                    "type": 1,
                    "options": [{ "name": "gallery_name", "type": 3, "value": "cats" }]
                }]
            }
        });

        let response = function_handler(signed_request(&create), state.clone())
            .await
            .expect("response");
        let body = json_body(&response);
        assert_eq!(body["type"], 4);
        assert_eq!(
            body["data"]["embeds"][0]["description"],
            "Gallery `cats` created :white_check_mark:"
        );
        assert!(state.gallery.store.exists("cats").await.expect("exists"));
    }
}
