use bzip2::read::MultiBzDecoder;
use bzip2::write::BzEncoder;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use xz2::read::XzDecoder;
use xz2::stream::{CONCATENATED, Stream};
use xz2::write::XzEncoder;

const ZSTD_LEVEL: i32 = 3;
const XZ_LEVEL: u32 = 6;

/// Compression applied to a text file, selected purely by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    /// `.gz`, `.z`
    Gzip,
    /// `.bz2`, `.bz`
    Bzip2,
    /// `.xz`, `.lzma`. Written as an xz container; reading also accepts
    /// legacy `.lzma` streams.
    Xz,
    /// `.zst`, `.zstd`
    Zstd,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Self::None;
        };
        match ext.to_ascii_lowercase().as_str() {
            "gz" | "z" => Self::Gzip,
            "bz2" | "bz" => Self::Bzip2,
            "xz" | "lzma" => Self::Xz,
            "zst" | "zstd" => Self::Zstd,
            _ => Self::None,
        }
    }
}

/// Writes `text` to `path`, creating or truncating the file.
///
/// # Errors
///
/// Returns an error if the file cannot be created, or if writing or
/// finishing the compressed stream fails.
pub fn write_text(path: &Path, text: &str) -> io::Result<()> {
    let file = BufWriter::new(File::create(path)?);
    match Compression::from_path(path) {
        Compression::None => {
            let mut writer = file;
            writer.write_all(text.as_bytes())?;
            writer.flush()
        }
        Compression::Gzip => {
            let mut encoder = GzEncoder::new(file, flate2::Compression::default());
            encoder.write_all(text.as_bytes())?;
            encoder.finish()?.flush()
        }
        Compression::Bzip2 => {
            let mut encoder = BzEncoder::new(file, bzip2::Compression::default());
            encoder.write_all(text.as_bytes())?;
            encoder.finish()?.flush()
        }
        Compression::Xz => {
            let mut encoder = XzEncoder::new(file, XZ_LEVEL);
            encoder.write_all(text.as_bytes())?;
            encoder.finish()?.flush()
        }
        Compression::Zstd => {
            let mut encoder = zstd::stream::write::Encoder::new(file, ZSTD_LEVEL)?;
            encoder.write_all(text.as_bytes())?;
            encoder.finish()?.flush()
        }
    }
}

/// Reads the whole of `path` as UTF-8 text, decompressing by extension.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, is not a valid stream of
/// the format its extension names, or does not decode to UTF-8.
pub fn read_text(path: &Path) -> io::Result<String> {
    let reader = BufReader::new(File::open(path)?);
    let mut text = String::new();
    match Compression::from_path(path) {
        Compression::None => {
            let mut reader = reader;
            reader.read_to_string(&mut text)?;
        }
        Compression::Gzip => {
            MultiGzDecoder::new(reader).read_to_string(&mut text)?;
        }
        Compression::Bzip2 => {
            MultiBzDecoder::new(reader).read_to_string(&mut text)?;
        }
        Compression::Xz => {
            let stream =
                Stream::new_auto_decoder(u64::MAX, CONCATENATED).map_err(io::Error::other)?;
            XzDecoder::new_stream(reader, stream).read_to_string(&mut text)?;
        }
        Compression::Zstd => {
            zstd::stream::read::Decoder::with_buffer(reader)?.read_to_string(&mut text)?;
        }
    }
    Ok(text)
}
