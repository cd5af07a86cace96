mod io;
mod kernel;

use anyhow::{bail, Context, Result};

use kernel::Driver;

fn main() -> Result<()> {
    env_logger::init();

    let ram = prompt("How much RAM is there?")?;
    let page_size = prompt_nonzero("What is the size of a page/frame?")?;
    let disk_count = prompt("How many hard disks does the simulated computer have?")?;

    let mut driver = Driver::new(ram, page_size, disk_count as usize);
    driver.start()
}

// Asks until the answer parses as a non-negative number.
fn prompt(question: &str) -> Result<u64> {
    loop {
        println!("{}", question);

        let mut line = String::new();
        let bytes_read = std::io::stdin()
            .read_line(&mut line)
            .context("failed to read startup parameter")?;
        if bytes_read == 0 {
            bail!("input ended before all startup parameters were given");
        }

        match line.trim().parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!("Please enter a non-negative whole number."),
        }
    }
}

fn prompt_nonzero(question: &str) -> Result<u64> {
    loop {
        let value = prompt(question)?;
        if value > 0 {
            return Ok(value);
        }
        println!("Please enter a number greater than zero.");
    }
}
