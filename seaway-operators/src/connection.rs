use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::debug;

use seaway_core::error::OperatorCallError;

struct ConnectionState {
    client: Option<reqwest::Client>,
    users: usize,
}

/// Scoped network session shared by all concurrent calls on one adapter
/// instance. The underlying HTTP client is built when the first caller
/// enters and dropped only after the last caller leaves, so it is never
/// torn down under an in-flight request. Entry/exit bookkeeping is
/// mutex-guarded reference counting.
pub struct SharedConnection {
    operator: String,
    timeout: Duration,
    state: Mutex<ConnectionState>,
}

impl SharedConnection {
    pub fn new(operator: &str, timeout: Duration) -> Self {
        Self {
            operator: operator.to_string(),
            timeout,
            state: Mutex::new(ConnectionState {
                client: None,
                users: 0,
            }),
        }
    }

    /// Run `f` with the shared client, holding a user reference for the
    /// duration. The reference is released on every exit path.
    pub async fn with<T, F, Fut>(&self, f: F) -> Result<T, OperatorCallError>
    where
        F: FnOnce(reqwest::Client) -> Fut,
        Fut: Future<Output = Result<T, OperatorCallError>>,
    {
        let client = self.enter().await?;
        let outcome = f(client).await;
        self.exit().await;
        outcome
    }

    async fn enter(&self) -> Result<reqwest::Client, OperatorCallError> {
        let mut state = self.state.lock().await;
        if state.client.is_none() {
            debug!(operator = %self.operator, "opening operator connection");
            let client = reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| OperatorCallError::Connection {
                    operator: self.operator.clone(),
                    message: format!("could not build http client: {e}"),
                })?;
            state.client = Some(client);
        }
        state.users += 1;
        // The clone shares the same pool; dropping it does not close the
        // session held in `state`.
        Ok(state
            .client
            .clone()
            .ok_or_else(|| OperatorCallError::Connection {
                operator: self.operator.clone(),
                message: "connection state lost".to_string(),
            })?)
    }

    async fn exit(&self) {
        let mut state = self.state.lock().await;
        state.users = state.users.saturating_sub(1);
        if state.users == 0 {
            debug!(operator = %self.operator, "closing operator connection");
            state.client = None;
        }
    }

    pub async fn is_open(&self) -> bool {
        self.state.lock().await.client.is_some()
    }

    pub async fn active_users(&self) -> usize {
        self.state.lock().await.users
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_connection_survives_concurrent_users() {
        let conn = Arc::new(SharedConnection::new("maghreb", Duration::from_secs(5)));

        let slow = {
            let conn = conn.clone();
            tokio::spawn(async move {
                conn.with(|_client| async {
                    tokio::time::sleep(Duration::from_millis(80)).await;
                    Ok(())
                })
                .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(conn.is_open().await);

        // A second caller entering and leaving must not close the session
        // while the slow call is still in flight.
        conn.with(|_client| async { Ok(()) }).await.unwrap();
        assert!(conn.is_open().await);
        assert_eq!(conn.active_users().await, 1);

        slow.await.unwrap().unwrap();
        assert!(!conn.is_open().await);
        assert_eq!(conn.active_users().await, 0);
    }

    #[tokio::test]
    async fn test_reference_released_on_error_path() {
        let conn = SharedConnection::new("adriatic", Duration::from_secs(5));
        let result: Result<(), _> = conn
            .with(|_client| async {
                Err(OperatorCallError::Connection {
                    operator: "adriatic".to_string(),
                    message: "boom".to_string(),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(conn.active_users().await, 0);
        assert!(!conn.is_open().await);
    }
}
