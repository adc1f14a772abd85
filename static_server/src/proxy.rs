//! Relais `/api/*` vers le backend REST.

use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error};

/// En-têtes transmis tels quels au backend.
const FORWARDED: [&str; 3] = ["authorization", "content-type", "accept"];

pub struct Backend {
    client: reqwest::Client,
    base: String,
}

impl Backend {
    pub fn new(base: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, base: base.into() })
    }

    /// Le chemin (préfixe `/api` compris) et la requête sont conservés.
    pub fn target_for(&self, path_and_query: &str) -> String {
        format!("{}{path_and_query}", self.base.trim_end_matches('/'))
    }
}

/// Corps au format des erreurs du backend, lisible par le front.
const UNREACHABLE: &str = r#"{"success":false,"message":"Serveur API injoignable."}"#;

fn bad_gateway() -> HttpResponse {
    HttpResponse::BadGateway()
        .content_type("application/json")
        .body(UNREACHABLE)
}

pub async fn forward(
    req: HttpRequest,
    body: web::Bytes,
    backend: web::Data<Backend>,
) -> HttpResponse {
    let path = req.uri().path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let url = backend.target_for(path);

    let Ok(method) = reqwest::Method::from_bytes(req.method().as_str().as_bytes()) else {
        return HttpResponse::MethodNotAllowed().finish();
    };

    let mut outgoing = backend.client.request(method, &url);
    for name in FORWARDED {
        if let Some(value) = req.headers().get(name).and_then(|v| v.to_str().ok()) {
            outgoing = outgoing.header(name, value);
        }
    }
    if !body.is_empty() {
        outgoing = outgoing.body(body.to_vec());
    }

    let resp = match outgoing.send().await {
        Ok(r) => r,
        Err(e) => {
            error!("{} {url} : {e}", req.method());
            return bad_gateway();
        }
    };

    let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    debug!("{} {url} -> {status}", req.method());

    match resp.bytes().await {
        Ok(bytes) => {
            let mut out = HttpResponse::build(status);
            if let Some(ct) = content_type {
                out.insert_header((header::CONTENT_TYPE, ct));
            }
            out.body(bytes.to_vec())
        }
        Err(e) => {
            error!("{url} : corps illisible : {e}");
            bad_gateway()
        }
    }
}
