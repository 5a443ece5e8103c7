use clap::Parser;
use clash_sub_sync::domain::model::PublishOutcome;
use clash_sub_sync::utils::{logger, validation::Validate};
use clash_sub_sync::{CliConfig, EtlEngine, GitPublisher, LocalStorage, SyncPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting clash-sub-sync");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match cli.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    if cli.dry_run {
        println!("{}", config.plan_summary());
        return Ok(());
    }

    let storage = LocalStorage::new(config.output.path.clone());
    let pipeline = match SyncPipeline::new(storage, &config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    let mut engine = EtlEngine::new(pipeline);
    if config.publish.enabled {
        engine = engine.with_publisher(Box::new(GitPublisher::new(
            config.publish.clone(),
            config.output.path.clone(),
            vec![
                config.output.links_file.clone(),
                config.output.config_file.clone(),
            ],
        )));
    }

    match engine.run().await {
        Ok(report) => {
            tracing::info!(
                "✅ Sync completed ({} links, config from {})",
                report.load.link_count,
                report.load.origin
            );
            println!("✅ 更新完成！");
            println!("📁 {}", report.load.links_path);
            println!("📁 {}", report.load.config_path);
            match report.publish {
                PublishOutcome::Published { message } => println!("🚀 {}", message),
                PublishOutcome::Failed { reason } => println!("⚠️ 更新成功但提交失败: {}", reason),
                PublishOutcome::Skipped => {}
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Sync failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
