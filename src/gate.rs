//! ログイン待機の実装

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{oneshot, Mutex};
use tracing::info;

use crate::error::ScraperError;
use crate::traits::LoginGate;

/// ターミナルで Enter が押されるまで待つ
#[derive(Debug, Clone, Default)]
pub struct ConsoleLoginGate;

#[async_trait]
impl LoginGate for ConsoleLoginGate {
    async fn wait_for_login(&self, login_url: &str) -> Result<(), ScraperError> {
        println!("Log in at {} in the browser window.", login_url);
        println!("Press Enter here when logged in successfully...");

        let mut line = String::new();
        let read = BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        if read == 0 {
            return Err(ScraperError::Login(
                "ログイン確認前に標準入力が閉じられました".into(),
            ));
        }

        info!("Login confirmed from console");
        Ok(())
    }
}

/// `LoginSignal` が発火されるまで待つ
#[derive(Debug)]
pub struct ChannelLoginGate {
    rx: Mutex<Option<oneshot::Receiver<()>>>,
}

/// `ChannelLoginGate` の再開シグナル
#[derive(Debug)]
pub struct LoginSignal {
    tx: oneshot::Sender<()>,
}

impl LoginSignal {
    pub fn confirm(self) {
        // 受信側が既に破棄されていても問題ない
        let _ = self.tx.send(());
    }
}

impl ChannelLoginGate {
    pub fn channel() -> (Self, LoginSignal) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                rx: Mutex::new(Some(rx)),
            },
            LoginSignal { tx },
        )
    }
}

#[async_trait]
impl LoginGate for ChannelLoginGate {
    async fn wait_for_login(&self, login_url: &str) -> Result<(), ScraperError> {
        info!("Waiting for login signal ({})", login_url);

        let rx = self
            .rx
            .lock()
            .await
            .take()
            .ok_or_else(|| ScraperError::Login("ログイン通知は使用済みです".into()))?;

        rx.await
            .map_err(|_| ScraperError::Login("ログイン通知が破棄されました".into()))?;

        info!("Login signal received");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_gate_resumes_on_confirm() {
        let (gate, signal) = ChannelLoginGate::channel();
        let waiter = tokio::spawn(async move { gate.wait_for_login("https://example.com").await });

        signal.confirm();
        assert!(waiter.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_channel_gate_fails_when_signal_dropped() {
        let (gate, signal) = ChannelLoginGate::channel();
        drop(signal);

        let err = gate.wait_for_login("https://example.com").await.unwrap_err();
        assert!(matches!(err, ScraperError::Login(_)));
    }

    #[tokio::test]
    async fn test_channel_gate_is_single_use() {
        let (gate, signal) = ChannelLoginGate::channel();
        signal.confirm();

        assert!(gate.wait_for_login("u").await.is_ok());
        assert!(gate.wait_for_login("u").await.is_err());
    }
}
