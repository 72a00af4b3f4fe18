use std::fs;
use std::io;
use std::io::Read;
use std::path::Path;

use flate2;


/// Open a file for reading, transparently decompressing `.gz` snapshots.
pub fn magic_open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Read>> {
	let path = path.as_ref();
	match path.extension() {
		Some(x) if x == "gz" => {
			Ok(Box::new(flate2::read::GzDecoder::new(fs::File::open(path)?)))
		},
		_ => Ok(Box::new(fs::File::open(path)?)),
	}
}

/// Replace `path` with a fresh, empty directory.
///
/// A missing directory is not an error; anything else propagates. Used by the
/// fetcher so that a crash mid-download leaves no partially-filled snapshot
/// directory behind.
pub fn ensure_empty_dir<P: AsRef<Path>>(path: P) -> io::Result<()> {
	let path = path.as_ref();
	match fs::remove_dir_all(path) {
		Ok(()) => (),
		Err(e) if e.kind() == io::ErrorKind::NotFound => (),
		Err(e) => return Err(e),
	}
	fs::create_dir_all(path)
}
