//! Static type catalog cache
//!
//! Pre-renders node and credential types as JSON arrays under
//! `<cache_dir>/types/<name>.json` so the static asset server can hand them
//! out without touching the catalog. Entries are serialized and written one at
//! a time; the catalog can be large.
//!
//! Each publish writes to a temporary file that is renamed over the target
//! when complete. A superseded or failed publish therefore never replaces the
//! last completed file. The cache is advisory: readers that find it missing
//! or corrupt regenerate it.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::{
	fs::{create_dir_all, read, remove_file, rename, File},
	io::{AsyncWrite, AsyncWriteExt, BufWriter},
};

use crate::prelude::*;

const TYPES_DIR: &str = "types";

#[derive(Debug, Clone)]
pub struct TypeCatalogPublisher {
	cache_dir: Box<Path>,
}

impl TypeCatalogPublisher {
	pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
		Self { cache_dir: cache_dir.into().into_boxed_path() }
	}

	pub fn types_dir(&self) -> PathBuf {
		self.cache_dir.join(TYPES_DIR)
	}

	/// Path of the cache file for a catalog kind. The name must be a plain
	/// file stem: ASCII letters, digits, `-` and `_`.
	pub fn file_path(&self, name: &str) -> ClResult<PathBuf> {
		let valid = !name.is_empty()
			&& name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
		if !valid {
			return Err(Error::ValidationError(format!("Invalid type cache name: {:?}", name)));
		}
		Ok(self.types_dir().join(format!("{}.json", name)))
	}

	/// Streams `entries` to the cache file for `name`, returns its path
	pub async fn publish<T: Serialize>(&self, name: &str, entries: &[T]) -> ClResult<PathBuf> {
		let target = self.file_path(name)?;
		let dir = self.types_dir();
		create_dir_all(&dir).await.map_err(|err| {
			Error::CatalogWriteFailed(format!("cannot create {}: {}", dir.display(), err))
		})?;

		let tmp_path = dir.join(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple()));

		let res = async {
			let file = File::create(&tmp_path).await?;
			let mut writer = BufWriter::new(file);
			write_entries(&mut writer, entries).await?;
			writer.flush().await?;
			writer.into_inner().sync_all().await?;
			rename(&tmp_path, &target).await?;
			Ok::<(), Error>(())
		}
		.await;

		if let Err(err) = res {
			warn!("Writing type cache '{}' failed: {}", name, err);
			if let Err(rm_err) = remove_file(&tmp_path).await {
				debug!("Removing {} failed: {}", tmp_path.display(), rm_err);
			}
			return Err(Error::CatalogWriteFailed(format!("{}: {}", name, err)));
		}

		debug!("Published {} {} entries to {}", entries.len(), name, target.display());
		Ok(target)
	}

	/// Reads a cache file back. `None` if it is missing or does not parse, in
	/// which case the caller should publish again.
	pub async fn read<T: DeserializeOwned>(&self, name: &str) -> ClResult<Option<Vec<T>>> {
		let path = self.file_path(name)?;
		let data = match read(&path).await {
			Ok(data) => data,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(err) => return Err(err.into()),
		};

		match serde_json::from_slice(&data) {
			Ok(entries) => Ok(Some(entries)),
			Err(err) => {
				warn!("Type cache {} is corrupt, ignoring it: {}", path.display(), err);
				Ok(None)
			}
		}
	}
}

/// Writes `[`, the entries separated by `,`, then `]`, one entry per line
async fn write_entries<W, T>(writer: &mut W, entries: &[T]) -> ClResult<()>
where
	W: AsyncWrite + Unpin,
	T: Serialize,
{
	writer.write_all(b"[\n").await?;
	for (index, entry) in entries.iter().enumerate() {
		let json = serde_json::to_vec(entry)?;
		writer.write_all(&json).await?;
		if index + 1 != entries.len() {
			writer.write_all(b",").await?;
		}
		writer.write_all(b"\n").await?;
	}
	writer.write_all(b"]\n").await?;
	Ok(())
}


// vim: ts=4
