mod config;
mod logger;
mod proxy;
mod routes;
mod tls;

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;

use crate::config::ServerConfig;
use crate::proxy::Backend;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cfg = ServerConfig::from_env()?;
    logger::init();

    info!("fichiers statiques : {}", cfg.dist.display());
    info!("API relayée vers {}", cfg.backend);

    let backend = web::Data::new(Backend::new(cfg.backend.clone())?);
    let dist = cfg.dist.clone();

    // -------- app factory -------------------------------------------------------
    let server = HttpServer::new(move || {
        let backend = backend.clone();
        let dist = dist.clone();
        App::new()
            .wrap(Logger::default())
            .configure(move |c| routes::configure(c, &dist, backend))
    });

    // -------- HTTPS si certificat fourni, sinon HTTP ---------------------------
    let server = match &cfg.tls {
        Some(t) => {
            let tls_cfg = tls::rustls_config(&t.cert, &t.key)?;
            info!("écoute en HTTPS sur {}", cfg.bind);
            server.bind_rustls_0_23(cfg.bind.as_str(), tls_cfg)?
        }
        None => {
            info!("écoute en HTTP sur {}", cfg.bind);
            server.bind(cfg.bind.as_str())?
        }
    };

    server.run().await?;
    Ok(())
}
