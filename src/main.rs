use tracing::{error, info};

use fieldbook::config::Config;
use fieldbook::engine::Engine;
use fieldbook::model::GetFieldsRequest;
use fieldbook::seed::{self, SeedFile};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?.with_seed_arg(std::env::args().nth(1));
    let Some(seed_path) = config.seed_path.clone() else {
        error!("no seed catalog given: pass a path or set FIELDBOOK_SEED");
        std::process::exit(2);
    };

    info!("fieldbook loading {}", seed_path.display());
    let seed = SeedFile::load(&seed_path)?;

    let (engine, store) = Engine::in_memory();
    let report = seed::apply(&engine, &store, &seed).await;

    let mut fields = Vec::new();
    let mut offset = 0;
    loop {
        let page = engine
            .get_all_fields(&GetFieldsRequest {
                offset: Some(offset),
                limit: Some(config.page_size),
                ..Default::default()
            })
            .await?;
        let n = page.len();
        fields.extend(page);
        if n < config.page_size {
            break;
        }
        offset += n;
    }

    let output = serde_json::json!({ "fields": fields, "report": report });
    let rendered = if config.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");

    if !report.rejected.is_empty() {
        error!("{} seed entries rejected", report.rejected.len());
        std::process::exit(1);
    }
    info!("fieldbook done");
    Ok(())
}
