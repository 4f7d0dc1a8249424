// UI layer: fills in whatever the command line did not provide using
// `dialoguer` prompts, then runs the upload behind an `indicatif` spinner.

use crate::api::{UploadClient, UploadResult};
use crate::cli::Args;
use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Values collected from arguments and prompts.
#[derive(Debug, Clone)]
pub struct UploadInputs {
    pub domain: String,
    pub client_id: String,
    pub client_pwd: String,
    pub brand_id: String,
    pub file: PathBuf,
}

/// Collect the inputs, check the file exists and run the upload.
pub fn run(client: &UploadClient, args: Args) -> Result<()> {
    let interactive = !args.is_complete();
    let inputs = collect_inputs(args)?;

    if !inputs.file.exists() {
        anyhow::bail!("file does not exist: {}", inputs.file.display());
    }

    if interactive {
        println!("\nStarting upload with the values entered...");
    } else {
        println!("domain: {}", inputs.domain);
        println!("clientId: {}", inputs.client_id);
        println!("brandId: {}", inputs.brand_id);
        println!("file: {}", inputs.file.display());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message("Uploading...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let brand_id = Some(inputs.brand_id.as_str());
    let outcome = client.handle_file_upload(
        &inputs.domain,
        &inputs.client_id,
        &inputs.client_pwd,
        brand_id,
        &inputs.file,
    );
    spinner.finish_and_clear();

    let result = outcome.context("upload failed")?;
    print_result(&result);
    Ok(())
}

/// Use argument values where present and prompt for the rest.
fn collect_inputs(args: Args) -> Result<UploadInputs> {
    let domain = match args.domain {
        Some(d) => d,
        None => required("API domain (e.g. https://api.example.com)")?,
    };
    let client_id = match args.client_id {
        Some(id) => id,
        None => required("Client ID")?,
    };
    let client_pwd = match args.client_pwd {
        Some(pwd) => pwd,
        None => Password::new().with_prompt("Client password").interact()?,
    };
    let brand_id = match args.brand_id {
        Some(b) => b,
        None => Input::<String>::new()
            .with_prompt("Brand ID (optional)")
            .allow_empty(true)
            .interact_text()?,
    };
    let file = match args.file {
        Some(f) => f,
        None => PathBuf::from(required("File path")?),
    };

    Ok(UploadInputs {
        domain: domain.trim().to_string(),
        client_id: client_id.trim().to_string(),
        client_pwd,
        brand_id: brand_id.trim().to_string(),
        file,
    })
}

fn required(prompt: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("this value is required")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(value)
}

fn print_result(result: &UploadResult) {
    println!("Upload successful: [{}] {}", result.code, result.message);
    match result.file_data() {
        Some(data) => {
            if let Some(id) = &data.file_id {
                println!("fileId: {}", id);
            }
            if let Some(url) = &data.img_url {
                println!("imgUrl: {}", url);
            }
            if let Some(exp) = &data.file_exp_dt {
                println!("fileExpDt: {}", exp);
            }
        }
        None => println!("data: {}", result.server_data),
    }
}
