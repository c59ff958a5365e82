//! Test chat client.
//!
//! Speaks the raw line protocol so tests can assert on exact server output.

use relay_proto::{AddressedMessage, ServerLine};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    name: Option<String>,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;

        // Split stream for reading and writing
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            name: None,
        })
    }

    /// Display name the server assigned, once logged in.
    #[allow(dead_code)]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Send a raw line.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with('\n') {
            self.writer.write_all(b"\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Send an addressed message.
    pub async fn send(&mut self, msg: AddressedMessage) -> anyhow::Result<()> {
        self.send_raw(&msg.to_string()).await
    }

    /// Receive a single raw line from the server.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a raw line with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            anyhow::bail!("connection closed by server");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Receive a line and classify it as a front-end would.
    pub async fn recv_line(&mut self) -> anyhow::Result<ServerLine> {
        Ok(ServerLine::classify(&self.recv().await?))
    }

    /// Receive lines until the predicate returns true.
    #[allow(dead_code)]
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<ServerLine>>
    where
        F: FnMut(&ServerLine) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.recv_line().await?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    /// Assert the server closes the connection within `dur`.
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self, dur: Duration) -> anyhow::Result<()> {
        let mut line = String::new();
        match timeout(dur, self.reader.read_line(&mut line)).await? {
            Ok(0) | Err(_) => Ok(()),
            Ok(_) => anyhow::bail!("expected close, got line {:?}", line.trim_end()),
        }
    }

    /// Log in and wait for our own entrance notice. Returns the user list
    /// received on login.
    pub async fn login(&mut self, name: &str) -> anyhow::Result<ServerLine> {
        self.send_raw(name).await?;

        let list = self.recv_line().await?;
        if !matches!(list, ServerLine::UserList(_)) {
            anyhow::bail!("Login failed: expected user list, got {list:?}");
        }

        match self.recv_line().await? {
            ServerLine::Notice(text) if text.ends_with(" has entered the chat") => {
                let assigned = text.trim_end_matches(" has entered the chat").to_string();
                self.name = Some(assigned);
                Ok(list)
            }
            other => anyhow::bail!("Login failed: expected entrance notice, got {other:?}"),
        }
    }

    /// Broadcast to everyone.
    #[allow(dead_code)]
    pub async fn say(&mut self, body: &str) -> anyhow::Result<()> {
        self.send(AddressedMessage::broadcast(body)).await
    }

    /// Whisper to one user.
    #[allow(dead_code)]
    pub async fn whisper(&mut self, to: &str, body: &str) -> anyhow::Result<()> {
        self.send(AddressedMessage::whisper(to, body)).await
    }

    /// Send `<?><quit>`.
    #[allow(dead_code)]
    pub async fn quit(&mut self) -> anyhow::Result<()> {
        self.send(AddressedMessage::control("quit")).await
    }
}
