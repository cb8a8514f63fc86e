// Conversion client against a one-shot local HTTP server
use image_converter::convert::{
    CompressionPreset, ConversionClient, ConversionRequest, ConvertConfig, ConvertError,
    OutputFormat, UploadFile,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn content_length(head: &str) -> Option<usize> {
    head.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.eq_ignore_ascii_case("content-length")
            .then(|| value.trim().parse().ok())
            .flatten()
    })
}

async fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut request = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        let n = stream.read(&mut chunk).await.expect("read failed");
        if n == 0 {
            break;
        }
        request.extend_from_slice(&chunk[..n]);

        let Some(head_end) = find(&request, b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&request[..head_end]).to_string();
        let done = match content_length(&head) {
            Some(len) => request.len() >= head_end + 4 + len,
            None => request.ends_with(b"0\r\n\r\n"),
        };
        if done {
            break;
        }
    }

    request
}

/// Accepts one request, answers with the given response and hands back the raw request.
async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
) -> (String, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept failed");
        let request = read_request(&mut stream).await;

        let header = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            content_type,
            body.len()
        );
        stream.write_all(header.as_bytes()).await.expect("write failed");
        stream.write_all(&body).await.expect("write failed");
        stream.shutdown().await.expect("shutdown failed");
        request
    });

    (format!("http://{}", addr), handle)
}

/// Answers 200 with a chunked body (no `Content-Length`). With `stall` the server sends the
/// first chunk and then goes quiet instead of finishing the body.
async fn serve_chunked_once(chunks: Vec<Vec<u8>>, stall: bool) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept failed");
        read_request(&mut stream).await;

        let header = "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n";
        if stream.write_all(header.as_bytes()).await.is_err() {
            return;
        }
        for chunk in chunks {
            let framed = [format!("{:x}\r\n", chunk.len()).into_bytes(), chunk, b"\r\n".to_vec()].concat();
            if stream.write_all(&framed).await.is_err() {
                return;
            }
            if stall {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                return;
            }
        }
        let _ = stream.write_all(b"0\r\n\r\n").await;
        let _ = stream.shutdown().await;
    });

    (format!("http://{}", addr), handle)
}

fn client(base_url: String) -> ConversionClient {
    ConversionClient::new(ConvertConfig {
        api_base_url: Some(base_url),
        ..ConvertConfig::default()
    })
    .expect("client init failed")
}

fn png_upload(name: &str) -> UploadFile {
    UploadFile::new(name, PNG_HEADER.to_vec())
}

#[tokio::test]
async fn single_file_conversion_posts_form_and_names_download() {
    let (base_url, server) = serve_once("200 OK", "image/webp", b"RIFFxxxxWEBP".to_vec()).await;

    let mut request = ConversionRequest::new()
        .with_format(OutputFormat::Webp)
        .with_preset(CompressionPreset::Web)
        .with_size(Some(640), None);
    request.add_file(png_upload("photo.final.png"));

    let output = client(base_url).convert(&request).await.expect("conversion failed");
    assert_eq!(output.file_name, "photo-converted.webp");
    assert_eq!(output.content_type.as_deref(), Some("image/webp"));
    assert_eq!(&output.bytes[..], b"RIFFxxxxWEBP");
    assert!(!output.is_archive());

    let raw = server.await.expect("server task panicked");
    let text = String::from_utf8_lossy(&raw);
    assert!(text.starts_with("POST /api/convert "));
    assert!(text.contains(r#"name="images"; filename="photo.final.png""#));
    assert!(text.contains(r#"name="format""#));
    assert!(text.contains("webp"));
    assert!(text.contains(r#"name="quality""#));
    assert!(text.contains("\r\n80\r\n"));
    assert!(text.contains(r#"name="width""#));
    assert!(!text.contains(r#"name="height""#));
}

#[tokio::test]
async fn multiple_files_download_as_archive() {
    let (base_url, server) = serve_once("200 OK", "application/zip", b"PK\x03\x04".to_vec()).await;

    let mut request = ConversionRequest::new().with_format(OutputFormat::Jpeg);
    request.add_file(png_upload("a.png"));
    request.add_file(png_upload("b.png"));

    let output = client(base_url).convert(&request).await.expect("conversion failed");
    assert_eq!(output.file_name, "converted-images.zip");
    assert!(output.is_archive());

    let raw = server.await.expect("server task panicked");
    let text = String::from_utf8_lossy(&raw);
    assert_eq!(text.matches(r#"name="images""#).count(), 2);
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    let (base_url, server) = serve_once(
        "400 Bad Request",
        "application/json",
        br#"{"error":"Unsupported output format"}"#.to_vec(),
    )
    .await;

    let mut request = ConversionRequest::new();
    request.add_file(png_upload("a.png"));

    let result = client(base_url).convert(&request).await;
    let _ = server.await;
    match result {
        Err(ConvertError::Server { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Unsupported output format");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn server_error_without_json_uses_generic_message() {
    let (base_url, server) =
        serve_once("502 Bad Gateway", "text/html", b"<html>bad gateway</html>".to_vec()).await;

    let mut request = ConversionRequest::new();
    request.add_file(png_upload("a.png"));

    let result = client(base_url).convert(&request).await;
    let _ = server.await;
    match result {
        Err(ConvertError::Server { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "Failed to convert images.");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let (base_url, server) = serve_once("200 OK", "image/png", vec![7u8; 64]).await;

    let client = ConversionClient::new(ConvertConfig {
        api_base_url: Some(base_url),
        max_response_bytes: 16,
        ..ConvertConfig::default()
    })
    .expect("client init failed");

    let mut request = ConversionRequest::new();
    request.add_file(png_upload("a.png"));

    let result = client.convert(&request).await;
    let _ = server.await;
    assert!(matches!(result, Err(ConvertError::ResourceLimit(_))));
}

#[tokio::test]
async fn chunked_response_is_read_in_full() {
    let (base_url, server) =
        serve_chunked_once(vec![b"\x89PNG".to_vec(), vec![1u8; 100], vec![2u8; 50]], false).await;

    let mut request = ConversionRequest::new();
    request.add_file(png_upload("a.png"));

    let output = client(base_url).convert(&request).await.expect("conversion failed");
    let _ = server.await;
    assert_eq!(output.bytes.len(), 154);
    assert_eq!(&output.bytes[..4], b"\x89PNG");
}

#[tokio::test]
async fn chunked_response_over_limit_is_aborted() {
    let chunks = (0..8).map(|_| vec![9u8; 32]).collect();
    let (base_url, server) = serve_chunked_once(chunks, false).await;

    let client = ConversionClient::new(ConvertConfig {
        api_base_url: Some(base_url),
        max_response_bytes: 100,
        ..ConvertConfig::default()
    })
    .expect("client init failed");

    let mut request = ConversionRequest::new();
    request.add_file(png_upload("a.png"));

    let result = client.convert(&request).await;
    server.abort();
    assert!(matches!(result, Err(ConvertError::ResourceLimit(_))));
}

#[tokio::test]
async fn stalled_response_body_times_out() {
    let (base_url, server) = serve_chunked_once(vec![vec![1u8; 16], vec![2u8; 16]], true).await;

    let client = ConversionClient::new(ConvertConfig {
        api_base_url: Some(base_url),
        stream_chunk_timeout_ms: 200,
        ..ConvertConfig::default()
    })
    .expect("client init failed");

    let mut request = ConversionRequest::new();
    request.add_file(png_upload("a.png"));

    let result = client.convert(&request).await;
    server.abort();
    assert!(matches!(result, Err(ConvertError::Timeout(_))));
}
