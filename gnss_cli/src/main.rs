use anyhow::{Context, Result};
use tracing::info;

mod cli;
mod driver;
mod logging;
mod source;

const READ_BUFFER_LEN: usize = 4096;

fn main() -> Result<()> {
    let matches = cli::command().get_matches();
    let options = cli::parse(&matches)?;
    logging::initialize(options.verbose);

    let mut source = source::Source::open(&options.input)?;
    let stdout = std::io::stdout();
    let mut driver = driver::Driver::new(&options, stdout.lock());

    let mut local_buf = [0; READ_BUFFER_LEN];
    loop {
        let Some(nbytes) = source
            .read_chunk(&mut local_buf)
            .with_context(|| format!("Failed to read from {}", source.label))?
        else {
            break;
        };
        if nbytes == 0 {
            continue;
        }
        driver.push(&source.label, &local_buf[..nbytes])?;
    }

    info!(source = %source.label, "end of stream");
    driver.report();
    Ok(())
}
