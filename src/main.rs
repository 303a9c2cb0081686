use tracing::error;

fn main() {
    if let Err(err) = pb_allocator::adapters::cli::run() {
        let code = err.code();
        error!("[{code}] {err}");
        std::process::exit(code.exit_code());
    }
}
