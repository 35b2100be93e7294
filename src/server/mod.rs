// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Stateless JSON query service.
//!
//! `GET /scale?root=<name>&scale=<key>[&extension=<ext>]` returns the
//! scale, its diatonic chords and their quality labels. `/api/scale` is
//! accepted as an alias. The service always spells with sharps.

use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::music::{derive_from_scale, Extension, Scale, ScaleType, Spelling, SHARP_NAMES};

/// Flat names the service maps onto their sharp equivalents
const ACCEPTED_FLATS: [&str; 5] = ["Db", "Eb", "Gb", "Ab", "Bb"];

const SCALE_ROUTES: [&str; 2] = ["/scale", "/api/scale"];

/// HTTP status plus JSON body
pub type QueryResponse = (u16, Value);

/// Blocking query server
pub struct QueryServer {
    server: Server,
}

impl QueryServer {
    /// Bind to the configured address
    pub fn bind(config: &ServerConfig) -> Result<Self> {
        let address = config.address();
        let server = Server::http(&address)
            .map_err(|e| anyhow!("Failed to bind query service to {}: {}", address, e))?;
        info!(address = %address, "query service listening");
        Ok(Self { server })
    }

    /// Actual bound address (useful when port 0 was requested)
    pub fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve requests until the listener fails
    pub fn run(&self) -> Result<()> {
        for request in self.server.incoming_requests() {
            self.respond(request);
        }
        Ok(())
    }

    /// Serve a single request, blocking until one arrives
    pub fn serve_one(&self) -> Result<()> {
        let request = self.server.recv()?;
        self.respond(request);
        Ok(())
    }

    fn respond(&self, request: Request) {
        let (status, body) = if *request.method() == Method::Get {
            handle_query(request.url())
        } else {
            (405, json!({ "error": "method not allowed" }))
        };
        info!(method = %request.method(), url = request.url(), status, "request");

        let mut response = Response::from_string(body.to_string()).with_status_code(status);
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
            response = response.with_header(header);
        }
        if let Err(e) = request.respond(response) {
            warn!(error = %e, "failed to send response");
        }
    }
}

/// Answer one request given its path and query string
pub fn handle_query(url: &str) -> QueryResponse {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    if !SCALE_ROUTES.contains(&path) {
        return (404, json!({ "error": "not found" }));
    }

    let params = parse_query(query);
    let param = |name: &str| {
        params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    };
    let root = param("root").unwrap_or("C");
    let scale = param("scale").unwrap_or("major");

    let scale_type = match ScaleType::from_query_key(scale) {
        Some(st) if is_service_root(root) => st,
        _ => {
            warn!(root, scale, "rejected scale query");
            return (400, json!({ "error": "unknown scale type or root" }));
        }
    };
    let extension = match param("extension").map(str::parse::<Extension>) {
        None => Extension::Triad,
        Some(Ok(ext)) => ext,
        Some(Err(e)) => {
            warn!(error = %e, "rejected scale query");
            return (400, json!({ "error": "unknown chord extension" }));
        }
    };

    let built = match Scale::with_spelling(root, scale_type, Spelling::Sharp) {
        Ok(built) => built,
        Err(e) => {
            warn!(error = %e, "rejected scale query");
            return (400, json!({ "error": "unknown scale type or root" }));
        }
    };
    let derivation = derive_from_scale(built, extension);
    let chords: Vec<Vec<&str>> = derivation.chords.iter().map(|c| c.note_names()).collect();

    (
        200,
        json!({
            "root": root,
            "scale": scale,
            "scaleNotes": derivation.scale.note_names(),
            "chords": chords,
            "qualities": derivation.qualities,
        }),
    )
}

/// The service accepts exact sharp names plus five flats, case-sensitive
fn is_service_root(root: &str) -> bool {
    SHARP_NAMES.contains(&root) || ACCEPTED_FLATS.contains(&root)
}

/// Split `a=1&b=2` into decoded pairs
fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(k), percent_decode(v))
        })
        .collect()
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => match (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                (Some(hi), Some(lo)) => {
                    out.push(hi << 4 | lo);
                    i += 2;
                }
                _ => out.push(b'%'),
            },
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(digit: u8) -> Option<u8> {
    (digit as char).to_digit(16).map(|d| d as u8)
}
