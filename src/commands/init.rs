//! Initialize a new blog directory

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# Site
title: Headless Blog
description: ''
author: ''
url: http://localhost:3000
root: /

# Content service
endpoint: http://localhost:8080/graphql
request_timeout: 30

# Seconds a listing or post stays fresh before it is fetched again
revalidate: 60

# Listing
per_page: 12
excerpt_length: 160
date_format: MMMM D, YYYY

# Slug enumeration
slug_limit: 100
slug_page_size: 100

# Output
public_dir: public

# HTML allowed in backend markup
sanitize:
  url_schemes: [http, https, mailto]
"#;

/// Write a default `_config.yml` into the target directory.
///
/// An existing config file is left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        tracing::warn!("{:?} already exists, leaving it as is", config_path);
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG)?;
    Ok(())
}
