use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::oneshot;
use tonic::Status;

use crate::error::{ErrorCategory, GrpcError};

/// Completion callback handed to a raw unary call. Invoked exactly once with
/// either a transport failure or a response.
pub type UnaryCallback<Resp> = Box<dyn FnOnce(Option<Status>, Option<Resp>) + Send>;

/// A callback-style unary call that borrows a shared client as its receiver.
pub type ContextCall<Ctx, Req, Resp> = Arc<dyn Fn(&Ctx, Req, UnaryCallback<Resp>) + Send + Sync>;

/// An adapted unary call: one request in, one awaitable classified result out.
pub type UnaryCall<Req, Resp> =
    Box<dyn Fn(Req) -> BoxFuture<'static, Result<Resp, GrpcError>> + Send + Sync>;

/// Convert a callback-style unary call into one returning an awaitable
/// result.
///
/// The returned function issues the call and suspends on a oneshot channel
/// until the completion callback fires. A reported failure is classified
/// into a [`GrpcError`]; a completion carrying neither failure nor response
/// rejects with a bare Unknown error. Each invocation owns its channel, so
/// concurrent calls share no state.
pub fn adapt<Req, Resp, F>(call: F) -> impl Fn(Req) -> BoxFuture<'static, Result<Resp, GrpcError>>
where
    F: Fn(Req, UnaryCallback<Resp>) + Clone + Send + Sync + 'static,
    Req: Send + 'static,
    Resp: Send + 'static,
{
    move |request: Req| -> BoxFuture<'static, Result<Resp, GrpcError>> {
        let call = call.clone();
        Box::pin(async move {
            let (tx, rx) = oneshot::channel::<(Option<Status>, Option<Resp>)>();
            call(
                request,
                Box::new(move |failure, response| {
                    let _ = tx.send((failure, response));
                }),
            );
            match rx.await {
                Ok((Some(status), _)) => Err(GrpcError::from(status)),
                Ok((None, Some(response))) => Ok(response),
                // Empty completion, or a call that dropped its callback
                // without ever invoking it.
                Ok((None, None)) | Err(_) => Err(GrpcError::new(ErrorCategory::Unknown)),
            }
        })
    }
}

/// Adapt every call in a client's call table at once, binding `context` as
/// the shared receiver. Key names are preserved; each entry is adapted
/// independently of the others.
pub fn adapt_all<Ctx, Req, Resp>(
    calls: HashMap<String, ContextCall<Ctx, Req, Resp>>,
    context: Arc<Ctx>,
) -> HashMap<String, UnaryCall<Req, Resp>>
where
    Ctx: Send + Sync + 'static,
    Req: Send + 'static,
    Resp: Send + 'static,
{
    calls
        .into_iter()
        .map(|(name, call)| {
            let context = Arc::clone(&context);
            let bound = move |request: Req, callback: UnaryCallback<Resp>| {
                call(&context, request, callback)
            };
            (name, Box::new(adapt(bound)) as UnaryCall<Req, Resp>)
        })
        .collect()
}

/// HTTP-style status for a call outcome: 200 when no error was raised, the
/// category's status for a classified error, 404 for anything else.
pub fn http_status(error: Option<&anyhow::Error>) -> u16 {
    match error {
        None => 200,
        Some(err) => match err.downcast_ref::<GrpcError>() {
            Some(classified) => classified.category().http_status(),
            None => 404,
        },
    }
}

/// Clone only the named keys out of a map. Keys absent from the source are
/// simply absent from the result.
pub fn pick<K, V>(map: &HashMap<K, V>, keys: &[K]) -> HashMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    keys.iter()
        .filter_map(|key| map.get_key_value(key).map(|(k, v)| (k.clone(), v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[tokio::test]
    async fn reported_failures_are_classified() {
        let call = adapt(|_req: i32, callback: UnaryCallback<i32>| {
            callback(Some(Status::invalid_argument("bad field")), None);
        });

        let err = call(1).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
        assert_eq!(err.message(), "bad field");
    }

    #[tokio::test]
    async fn unrecognized_failure_codes_become_unknown() {
        let call = adapt(|_req: i32, callback: UnaryCallback<i32>| {
            callback(Some(Status::new(Code::Unavailable, "server down")), None);
        });

        let err = call(1).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Unknown);
        assert_eq!(err.message(), "server down");
    }

    #[tokio::test]
    async fn empty_completion_rejects_with_bare_unknown() {
        let call = adapt(|_req: i32, callback: UnaryCallback<i32>| {
            callback(None, None);
        });

        let err = call(1).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Unknown);
        assert_eq!(err.to_string(), "Unknown");
    }

    #[tokio::test]
    async fn dropped_callback_rejects_with_bare_unknown() {
        let call = adapt(|_req: i32, callback: UnaryCallback<i32>| {
            drop(callback);
        });

        let err = call(1).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Unknown);
    }

    #[tokio::test]
    async fn responses_resolve_unchanged() {
        let call = adapt(|req: i32, callback: UnaryCallback<i32>| {
            callback(None, Some(req + 1));
        });

        assert_eq!(call(41).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn adapt_all_preserves_keys_and_keeps_entries_independent() {
        struct FakeClient {
            greeting: String,
        }

        let mut calls: HashMap<String, ContextCall<FakeClient, String, String>> = HashMap::new();
        calls.insert(
            "greet".to_string(),
            Arc::new(|client: &FakeClient, name: String, callback: UnaryCallback<String>| {
                callback(None, Some(format!("{} {name}", client.greeting)));
            }),
        );
        calls.insert(
            "reject".to_string(),
            Arc::new(|_client: &FakeClient, _name: String, callback: UnaryCallback<String>| {
                callback(Some(Status::permission_denied("nope")), None);
            }),
        );

        let client = Arc::new(FakeClient {
            greeting: "hello".to_string(),
        });
        let wrapped = adapt_all(calls, client);

        let mut keys: Vec<_> = wrapped.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["greet", "reject"]);

        let err = wrapped["reject"]("world".to_string()).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::PermissionDenied);

        let greeting = wrapped["greet"]("world".to_string()).await.unwrap();
        assert_eq!(greeting, "hello world");
    }

    #[test]
    fn http_status_covers_the_full_table() {
        assert_eq!(http_status(None), 200);

        let classified = [
            (GrpcError::invalid_argument("x"), 406),
            (GrpcError::not_found("x"), 404),
            (GrpcError::permission_denied("x"), 403),
            (GrpcError::unauthenticated("x"), 401),
            (GrpcError::unknown("x"), 404),
        ];
        for (err, expected) in classified {
            let err = anyhow::Error::new(err);
            assert_eq!(http_status(Some(&err)), expected);
        }

        let generic = anyhow::anyhow!("boom");
        assert_eq!(http_status(Some(&generic)), 404);
    }

    #[test]
    fn pick_keeps_only_the_named_keys() {
        let map: HashMap<&str, i32> = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();

        let expected: HashMap<&str, i32> = [("a", 1), ("c", 3)].into_iter().collect();
        assert_eq!(pick(&map, &["a", "c"]), expected);
    }

    #[test]
    fn pick_skips_absent_keys() {
        let map: HashMap<&str, i32> = [("a", 1)].into_iter().collect();

        let expected: HashMap<&str, i32> = [("a", 1)].into_iter().collect();
        assert_eq!(pick(&map, &["a", "missing"]), expected);
    }
}
