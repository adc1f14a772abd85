use std::path::{Path, PathBuf};

use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use actix_web::web;

use crate::proxy::{self, Backend};

/* ---------- Fallback SPA (index.html) ----------------------------------- */
fn spa_files(dist: &Path) -> Files {
    let index: PathBuf = dist.join("index.html");
    Files::new("/", dist)
        .index_file("index.html")
        .default_handler(fn_service(move |req: ServiceRequest| {
            let index = index.clone();
            async move {
                let (req, _) = req.into_parts();
                let file = NamedFile::open_async(&index).await?;
                let res = file.into_response(&req);
                Ok(ServiceResponse::new(req, res))
            }
        }))
}

/// `/api/*` relayé au backend, tout le reste servi depuis `dist`.
pub fn configure(cfg: &mut web::ServiceConfig, dist: &Path, backend: web::Data<Backend>) {
    cfg.app_data(backend)
        .service(web::scope("/api").default_service(web::to(proxy::forward)))
        .service(spa_files(dist));
}
