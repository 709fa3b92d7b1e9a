use rag_explorer::http::HttpServer;
use rag_explorer::{ExplorerConfig, Session};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("RAG Pipeline Explorer v{}", rag_explorer::VERSION);
    println!("==========================================");

    let config = match ExplorerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let session = match Session::from_config(&config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("Provider: {:?} ({})", config.genai.provider, config.genai.model);
    println!("Endpoints:");
    println!("  GET  /api/session");
    println!("  POST /api/playback/start   {{\"scenario\": \"query\"}}");
    println!("  POST /api/playback/advance");
    println!("  POST /api/playback/reset");
    println!("  POST /api/image            {{\"prompt\": \"...\", \"size\": \"1K\"}}");
    println!();

    let server = HttpServer::new(session, config.http.bind.clone(), config.http.port);
    if let Err(e) = server.start().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
