//! Minimal SMTP server that accepts every command and keeps each message.

use std::sync::Arc;

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpListener,
    sync::Mutex,
    task::JoinHandle,
};

pub struct SmtpSink {
    port: u16,
    messages: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl SmtpSink {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let messages = Arc::new(Mutex::new(Vec::new()));

        let received = Arc::clone(&messages);
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let received = Arc::clone(&received);
                tokio::spawn(async move {
                    let (reader, mut writer) = stream.into_split();
                    let mut lines = BufReader::new(reader).lines();

                    writer.write_all(b"220 sink ready\r\n").await.unwrap();

                    while let Ok(Some(line)) = lines.next_line().await {
                        let verb = line
                            .split_whitespace()
                            .next()
                            .unwrap_or_default()
                            .to_ascii_uppercase();

                        let reply: &[u8] = match verb.as_str() {
                            "EHLO" => b"250-sink\r\n250 AUTH PLAIN LOGIN\r\n",
                            "AUTH" => b"235 2.7.0 Authentication successful\r\n",
                            "DATA" => {
                                writer.write_all(b"354 go ahead\r\n").await.unwrap();

                                let mut message = String::new();
                                while let Ok(Some(data)) = lines.next_line().await {
                                    if data == "." {
                                        break;
                                    }
                                    message.push_str(&data);
                                    message.push_str("\r\n");
                                }
                                received.lock().await.push(message);

                                b"250 2.0.0 queued\r\n"
                            }
                            "QUIT" => {
                                writer.write_all(b"221 bye\r\n").await.unwrap();
                                break;
                            }
                            _ => b"250 OK\r\n",
                        };

                        writer.write_all(reply).await.unwrap();
                    }
                });
            }
        });

        Self {
            port,
            messages,
            handle,
        }
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    pub async fn messages(&self) -> Vec<String> {
        self.messages.lock().await.clone()
    }
}

impl Drop for SmtpSink {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
