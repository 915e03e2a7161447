use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ストアの debug/warn イベントを JSON で標準出力へ流すサブスクライバーを登録する
///
/// レベルは `RUST_LOG` で指定する（例: `RUST_LOG=infrastructure=debug`）。
/// 呼び出し側のエントリポイントと統合テストから一度だけ呼ぶ想定で、
/// 二回目以降はパニックせずエラーを返す。
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).json())
        .with(EnvFilter::from_default_env())
        .try_init()?;

    Ok(())
}
