//! Pure socket-protocol client engine.
//!
//! Speaks RESP2 directly over a TCP or unix-domain stream, with no
//! extension bindings involved. Only the command vocabulary the store
//! client needs is implemented: `AUTH`, `SELECT`, `GET`, `SET`/`SETEX`,
//! `EXISTS` and `EVAL`.

use async_trait::async_trait;
use pagevault_config::ConnectionParams;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;
use tracing::debug;

use super::Driver;
use crate::error::{StoreError, StoreResult};

trait Transport: AsyncRead + AsyncWrite + Send + Unpin {}
impl<T: AsyncRead + AsyncWrite + Send + Unpin> Transport for T {}

/// Decoded server reply.
#[derive(Debug, PartialEq)]
enum Reply {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Option<Vec<u8>>),
    Array(Vec<Reply>),
}

/// Driver speaking RESP2 over a raw socket.
///
/// The password travels in the connection options and is sent as part of
/// the handshake, before database selection.
pub struct RespDriver {
    stream: BufStream<Box<dyn Transport>>,
}

impl RespDriver {
    pub async fn connect(params: &ConnectionParams) -> StoreResult<Self> {
        let transport: Box<dyn Transport> = if params.is_unix() {
            connect_unix(&params.host).await?
        } else {
            Box::new(TcpStream::connect((params.host.as_str(), params.port)).await?)
        };

        let mut driver = Self {
            stream: BufStream::new(transport),
        };
        if let Some(pwd) = params.pwd.as_deref() {
            driver.authenticate(pwd).await?;
        }
        driver.select_db(params.db).await?;
        debug!(host = %params.host, unix = params.is_unix(), "socket-protocol driver connected");
        Ok(driver)
    }

    async fn command(&mut self, args: &[&[u8]]) -> StoreResult<Reply> {
        self.stream.write_all(&encode_command(args)).await?;
        self.stream.flush().await?;
        match read_reply(&mut self.stream).await? {
            Reply::Error(msg) => Err(StoreError::Server(msg)),
            reply => Ok(reply),
        }
    }
}

#[async_trait]
impl Driver for RespDriver {
    async fn authenticate(&mut self, pwd: &str) -> StoreResult<()> {
        expect_ok(self.command(&[b"AUTH", pwd.as_bytes()]).await?)
    }

    async fn select_db(&mut self, db: i64) -> StoreResult<()> {
        let db = db.to_string();
        expect_ok(self.command(&[b"SELECT", db.as_bytes()]).await?)
    }

    async fn get(&mut self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        match self.command(&[b"GET", key.as_bytes()]).await? {
            Reply::Bulk(value) => Ok(value),
            other => Err(unexpected("GET", &other)),
        }
    }

    async fn set_with_expiry(
        &mut self,
        key: &str,
        value: &[u8],
        expiry: Duration,
    ) -> StoreResult<()> {
        if expiry.is_zero() {
            expect_ok(self.command(&[b"SET", key.as_bytes(), value]).await?)
        } else {
            let secs = expiry.as_secs().to_string();
            expect_ok(
                self.command(&[b"SETEX", key.as_bytes(), secs.as_bytes(), value])
                    .await?,
            )
        }
    }

    async fn exists(&mut self, key: &str) -> StoreResult<bool> {
        match self.command(&[b"EXISTS", key.as_bytes()]).await? {
            Reply::Integer(n) => Ok(n > 0),
            other => Err(unexpected("EXISTS", &other)),
        }
    }

    async fn run_script(&mut self, body: &str) -> StoreResult<i64> {
        // The flush script takes no key arguments; matching happens
        // server-side, hence the explicit trailing zero key count.
        match self.command(&[b"EVAL", body.as_bytes(), b"0"]).await? {
            Reply::Integer(n) => Ok(n),
            other => Err(unexpected("EVAL", &other)),
        }
    }
}

#[cfg(unix)]
async fn connect_unix(path: &str) -> StoreResult<Box<dyn Transport>> {
    Ok(Box::new(UnixStream::connect(path).await?))
}

#[cfg(not(unix))]
async fn connect_unix(_path: &str) -> StoreResult<Box<dyn Transport>> {
    Err(StoreError::Protocol(
        "unix sockets are unsupported on this platform".to_string(),
    ))
}

fn expect_ok(reply: Reply) -> StoreResult<()> {
    match reply {
        Reply::Simple(ref s) if s == "OK" => Ok(()),
        other => Err(unexpected("command", &other)),
    }
}

fn unexpected(command: &str, reply: &Reply) -> StoreError {
    StoreError::Protocol(format!("unexpected reply to {command}: {reply:?}"))
}

/// Encodes a command as a RESP array of bulk strings.
fn encode_command(args: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(format!("*{}\r\n", args.len()).as_bytes());
    for arg in args {
        out.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
        out.extend_from_slice(arg);
        out.extend_from_slice(b"\r\n");
    }
    out
}

/// Reads one reply off the wire.
async fn read_reply<R>(reader: &mut R) -> StoreResult<Reply>
where
    R: AsyncBufRead + Unpin + Send,
{
    let line = read_line(reader).await?;
    let (prefix, rest) = line
        .split_at_checked(1)
        .ok_or_else(|| StoreError::Protocol("empty reply line".to_string()))?;
    match prefix.as_bytes()[0] {
        b'+' => Ok(Reply::Simple(rest.to_string())),
        b'-' => Ok(Reply::Error(rest.to_string())),
        b':' => Ok(Reply::Integer(parse_int(rest)?)),
        b'$' => {
            let len = parse_int(rest)?;
            if len < 0 {
                return Ok(Reply::Bulk(None));
            }
            let mut payload = vec![0u8; len as usize];
            reader.read_exact(&mut payload).await?;
            let mut crlf = [0u8; 2];
            reader.read_exact(&mut crlf).await?;
            if &crlf != b"\r\n" {
                return Err(StoreError::Protocol(
                    "missing CRLF after bulk string".to_string(),
                ));
            }
            Ok(Reply::Bulk(Some(payload)))
        }
        b'*' => {
            let len = parse_int(rest)?;
            if len < 0 {
                return Ok(Reply::Array(Vec::new()));
            }
            let mut items = Vec::with_capacity(len as usize);
            for _ in 0..len {
                items.push(Box::pin(read_reply(reader)).await?);
            }
            Ok(Reply::Array(items))
        }
        other => Err(StoreError::Protocol(format!(
            "unknown reply prefix {:?}",
            other as char
        ))),
    }
}

/// Reads a CRLF-terminated line, without the terminator.
async fn read_line<R>(reader: &mut R) -> StoreResult<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = reader.read_until(b'\n', &mut buf).await?;
    if n == 0 || !buf.ends_with(b"\r\n") {
        return Err(StoreError::Protocol(
            "truncated reply line".to_string(),
        ));
    }
    buf.truncate(buf.len() - 2);
    String::from_utf8(buf)
        .map_err(|_| StoreError::Protocol("non-UTF-8 reply line".to_string()))
}

fn parse_int(s: &str) -> StoreResult<i64> {
    s.parse()
        .map_err(|_| StoreError::Protocol(format!("invalid integer: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_simple_string() {
        let mut input = &b"+OK\r\n"[..];
        assert_eq!(
            read_reply(&mut input).await.unwrap(),
            Reply::Simple("OK".to_string())
        );
    }

    #[tokio::test]
    async fn parses_error() {
        let mut input = &b"-ERR unknown command\r\n"[..];
        assert_eq!(
            read_reply(&mut input).await.unwrap(),
            Reply::Error("ERR unknown command".to_string())
        );
    }

    #[tokio::test]
    async fn parses_integer() {
        let mut input = &b":42\r\n"[..];
        assert_eq!(read_reply(&mut input).await.unwrap(), Reply::Integer(42));
    }

    #[tokio::test]
    async fn parses_bulk_string() {
        let mut input = &b"$5\r\nhello\r\n"[..];
        assert_eq!(
            read_reply(&mut input).await.unwrap(),
            Reply::Bulk(Some(b"hello".to_vec()))
        );
    }

    #[tokio::test]
    async fn parses_binary_bulk_string() {
        let mut input = &b"$4\r\n\x00\x01\r\n\r\n"[..];
        assert_eq!(
            read_reply(&mut input).await.unwrap(),
            Reply::Bulk(Some(vec![0, 1, b'\r', b'\n']))
        );
    }

    #[tokio::test]
    async fn parses_null_bulk() {
        let mut input = &b"$-1\r\n"[..];
        assert_eq!(read_reply(&mut input).await.unwrap(), Reply::Bulk(None));
    }

    #[tokio::test]
    async fn parses_array() {
        let mut input = &b"*2\r\n:3\r\n$3\r\nfoo\r\n"[..];
        assert_eq!(
            read_reply(&mut input).await.unwrap(),
            Reply::Array(vec![Reply::Integer(3), Reply::Bulk(Some(b"foo".to_vec()))])
        );
    }

    #[tokio::test]
    async fn rejects_truncated_reply() {
        let mut input = &b"+OK"[..];
        assert!(matches!(
            read_reply(&mut input).await,
            Err(StoreError::Protocol(_))
        ));
    }

    #[test]
    fn encodes_command_as_bulk_array() {
        assert_eq!(
            encode_command(&[b"GET", b"wp_page:/home"]),
            b"*2\r\n$3\r\nGET\r\n$13\r\nwp_page:/home\r\n"
        );
    }

    #[test]
    fn encodes_binary_argument() {
        assert_eq!(
            encode_command(&[b"SET", b"k", b"\x00\xff"]),
            b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$2\r\n\x00\xff\r\n"
        );
    }
}
