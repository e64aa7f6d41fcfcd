// src/core/net.rs

// HTTP/1.0 GET over TLS

use std::{error::Error, io::{Read, Write}, net::TcpStream, time::Duration};

use native_tls::TlsConnector;

use crate::config::consts::{MAX_REDIRECTS, USER_AGENT};
use crate::core::html::to_lower;

pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>, // names lowercased
    pub body: String,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = to_lower(name);
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// GET a page body over HTTPS, following redirects (the catalog site bounces
/// catalogitem.page requests through a canonical-URL redirect).
pub fn https_get(host: &str, path: &str) -> Result<String, Box<dyn Error>> {
    let mut host = s!(host);
    let mut path = s!(path);

    for _ in 0..MAX_REDIRECTS {
        let resp = request(&host, &path)?;
        match resp.status {
            301 | 302 | 303 | 307 | 308 => {
                let loc = resp
                    .header("location")
                    .ok_or("Redirect without Location header")?;
                match split_url(loc) {
                    Some((h, p)) => { host = h; path = p; }
                    None => path = resolve_location(&path, loc),
                }
            }
            200 => return Ok(resp.body),
            status => return Err(format!("HTTP error: {} {}{}", status, host, path).into()),
        }
    }
    Err(format!("Too many redirects: {}{}", host, path).into())
}

fn request(host: &str, path: &str) -> Result<Response, Box<dyn Error>> {
    let tcp = TcpStream::connect((host, 443))?;
    tcp.set_read_timeout(Some(Duration::from_secs(15)))?;
    tcp.set_write_timeout(Some(Duration::from_secs(15)))?;

    let connector = TlsConnector::new()?;
    let mut s = connector.connect(host, tcp)?;

    let req = format!(
        "GET {} HTTP/1.0\r\nHost: {}\r\nUser-Agent: {}\r\nAccept: text/html\r\nConnection: close\r\n\r\n",
        path, host, USER_AGENT
    );
    s.write_all(req.as_bytes())?;
    s.flush()?;

    let mut buf = Vec::new();
    s.read_to_end(&mut buf)?;
    parse_response(&buf)
}

fn parse_response(raw: &[u8]) -> Result<Response, Box<dyn Error>> {
    let text = String::from_utf8_lossy(raw);
    let head_end = text.find("\r\n\r\n").ok_or("Malformed HTTP response")?;

    let mut lines = text[..head_end].split("\r\n");
    let status_line = lines.next().unwrap_or("");
    let status: u16 = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| format!("Malformed status line: {}", status_line))?;

    let mut headers = Vec::new();
    for line in lines {
        if let Some(i) = line.find(':') {
            headers.push((to_lower(line[..i].trim()), line[i + 1..].trim().to_string()));
        }
    }

    let mut body = text[head_end + 4..].to_string();
    let chunked = headers
        .iter()
        .any(|(n, v)| n == "transfer-encoding" && to_lower(v).contains("chunked"));
    if chunked {
        body = decode_chunked(&body);
    }

    Ok(Response { status, headers, body })
}

/// "https://host/path" → (host, path). None for anything else (e.g. a relative Location).
pub fn split_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    match rest.find('/') {
        Some(i) => Some((s!(&rest[..i]), s!(&rest[i..]))),
        None => Some((s!(rest), s!("/"))),
    }
}

/// Resolve a relative Location value against the current request path.
fn resolve_location(current: &str, loc: &str) -> String {
    if loc.starts_with('/') {
        return s!(loc);
    }
    // relative to the current path's directory
    match current.rfind('/') {
        Some(i) => join!(&current[..i + 1], loc),
        None => join!("/", loc),
    }
}

fn decode_chunked(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    loop {
        let Some(nl) = rest.find("\r\n") else { break };
        let size_field = rest[..nl].split(';').next().unwrap_or("").trim();
        let Ok(size) = usize::from_str_radix(size_field, 16) else { break };
        if size == 0 {
            break;
        }
        let start = nl + 2;
        if start + size > rest.len() {
            // truncated chunk; keep what arrived
            out.push_str(&rest[start.min(rest.len())..]);
            break;
        }
        out.push_str(&rest[start..start + size]);
        rest = rest[start + size..].trim_start_matches("\r\n");
    }
    out
}
