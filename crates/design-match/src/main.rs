use design_match::cli::parse_cli;
use design_match::settings::resolve_settings;
use design_match::{DesignMatchError, run};
use design_match_types::ComparisonResult;
use log::error;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = execute().await {
        error!("{err}");
        std::process::exit(err.exit_code());
    }
}

async fn execute() -> Result<(), DesignMatchError> {
    let (cli, sources) = parse_cli();
    let settings = resolve_settings(&cli, &sources)?;
    let result = run(settings).await?;
    print_summary(&result);
    Ok(())
}

fn print_summary(result: &ComparisonResult) {
    let scores = &result.component_scores;
    println!("overall score: {:.2}", result.overall_score);
    println!(
        "layout ({}): {:.4}  text: {:.0}%  color: {:.4}",
        result.metric.as_str(),
        scores.layout,
        scores.text,
        scores.color
    );
    if result.extraction_degraded {
        println!("warning: text extraction degraded, text scores may be unreliable");
    }
    println!("issues: {}", result.issues.len());
    for issue in &result.issues {
        println!(
            "  {:>3}. [{}] {}: {}",
            issue.id,
            issue.severity.as_str(),
            issue.category.as_str(),
            issue.description
        );
    }
}
