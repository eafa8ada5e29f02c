use std::{fs, path::Path, sync::Arc};

use anyhow::Context;

/// Opens (creating if needed) the sled database at `<datadir>/sled/<dbname>`.
pub fn open_sled_database(datadir: &Path, dbname: &'static str) -> anyhow::Result<Arc<sled::Db>> {
    let mut database_dir = datadir.to_path_buf();
    database_dir.push("sled");
    database_dir.push(dbname);

    if !database_dir.exists() {
        fs::create_dir_all(&database_dir)
            .with_context(|| format!("creating {}", database_dir.display()))?;
    }

    let sled_db = sled::open(&database_dir).context("opening sled database")?;
    Ok(Arc::new(sled_db))
}
