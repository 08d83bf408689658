//! Archive format registry and classification.
//!
//! Classification is name-first: a table of recognized suffixes maps a
//! filename to a format, with compound suffixes (`.tar.gz`, `.tbz2`, ...)
//! producing a container-over-compression chain. When the name gives nothing
//! away, a magic-number sniff of the file's first bytes decides. The table is
//! static data: adding a format is a data change, not new branching logic.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// Supported archive and compression formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Unix tape archive (.tar, plus compressed variants).
    Tar,
    /// ZIP archive (.zip, .jar, self-extracting .exe).
    Zip,
    /// 7-Zip archive (.7z).
    SevenZip,
    /// Microsoft Cabinet (.cab).
    Cab,
    /// RAR archive (.rar).
    Rar,
    /// LZH/LHA archive (.lzh, .lha).
    Lzh,
    /// ARJ archive (.arj).
    Arj,
    /// cpio archive (.cpio).
    Cpio,
    /// RPM package (.rpm).
    Rpm,
    /// Debian package (.deb).
    Deb,
    /// Ruby gem (.gem).
    Gem,
    /// InstallShield cabinet (.cab with ISc( signature).
    InstallShield,
    /// GZIP compressed file (.gz).
    Gzip,
    /// Bzip2 compressed file (.bz2).
    Bzip2,
    /// XZ compressed file (.xz).
    Xz,
    /// Raw LZMA compressed file (.lzma).
    Lzma,
    /// Lrzip compressed file (.lrz).
    Lrzip,
    /// Lzip compressed file (.lz).
    Lzip,
    /// Unix compress file (.Z).
    Compress,
}

/// A classified archive: at most a two-format chain.
///
/// `compression` is the outer stream layer wrapped around a Tar container
/// (`foo.tar.gz` is Tar over Gzip). Pure compression streams carry their
/// stream tag in `format` with no chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The effective format driving extraction.
    pub format: Format,
    /// Outer compression layer, when `format` is a compressed Tar.
    pub compression: Option<Format>,
    /// Filename with all recognized suffixes stripped.
    pub base_name: String,
}

/// Recognized filename suffixes, longest match wins.
///
/// Each entry is (suffix, format, compression layer). Matched
/// case-insensitively so `.tar.Z` and `.TGZ` work.
const SUFFIXES: &[(&str, Format, Option<Format>)] = &[
    (".tar.gz", Format::Tar, Some(Format::Gzip)),
    (".tar.bz2", Format::Tar, Some(Format::Bzip2)),
    (".tar.xz", Format::Tar, Some(Format::Xz)),
    (".tar.lzma", Format::Tar, Some(Format::Lzma)),
    (".tar.lrz", Format::Tar, Some(Format::Lrzip)),
    (".tar.lz", Format::Tar, Some(Format::Lzip)),
    (".tar.z", Format::Tar, Some(Format::Compress)),
    (".tgz", Format::Tar, Some(Format::Gzip)),
    (".tbz2", Format::Tar, Some(Format::Bzip2)),
    (".tbz", Format::Tar, Some(Format::Bzip2)),
    (".txz", Format::Tar, Some(Format::Xz)),
    (".tlz", Format::Tar, Some(Format::Lzma)),
    (".taz", Format::Tar, Some(Format::Compress)),
    (".tar", Format::Tar, None),
    (".zip", Format::Zip, None),
    (".jar", Format::Zip, None),
    (".exe", Format::Zip, None),
    (".7z", Format::SevenZip, None),
    (".cab", Format::Cab, None),
    (".rar", Format::Rar, None),
    (".lzh", Format::Lzh, None),
    (".lha", Format::Lzh, None),
    (".arj", Format::Arj, None),
    (".cpio", Format::Cpio, None),
    (".rpm", Format::Rpm, None),
    (".deb", Format::Deb, None),
    (".gem", Format::Gem, None),
    (".gz", Format::Gzip, None),
    (".bz2", Format::Bzip2, None),
    (".xz", Format::Xz, None),
    (".lzma", Format::Lzma, None),
    (".lrz", Format::Lrzip, None),
    (".lz", Format::Lzip, None),
    (".z", Format::Compress, None),
];

impl Format {
    /// Detect format from magic bytes.
    pub fn from_magic(magic: &[u8]) -> Option<Self> {
        if magic.len() < 2 {
            return None;
        }

        // InstallShield cabinets before MSCF: both use the .cab extension.
        if magic.starts_with(b"ISc(") {
            return Some(Self::InstallShield);
        }
        if magic.starts_with(b"MSCF") {
            return Some(Self::Cab);
        }
        if magic.starts_with(&[0x50, 0x4B]) {
            return Some(Self::Zip);
        }
        if magic.starts_with(&[0x1F, 0x8B]) {
            return Some(Self::Gzip);
        }
        // Unix compress
        if magic.starts_with(&[0x1F, 0x9D]) {
            return Some(Self::Compress);
        }
        if magic.len() >= 3 && magic.starts_with(&[0x42, 0x5A, 0x68]) {
            return Some(Self::Bzip2);
        }
        if magic.len() >= 6 && magic.starts_with(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]) {
            return Some(Self::SevenZip);
        }
        if magic.len() >= 6 && magic.starts_with(&[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00]) {
            return Some(Self::Xz);
        }
        if magic.starts_with(b"Rar!") {
            return Some(Self::Rar);
        }
        if magic.starts_with(b"LZIP") {
            return Some(Self::Lzip);
        }
        if magic.starts_with(b"LRZI") {
            return Some(Self::Lrzip);
        }
        if magic.len() >= 4 && magic.starts_with(&[0xED, 0xAB, 0xEE, 0xDB]) {
            return Some(Self::Rpm);
        }
        if magic.starts_with(b"!<arch>\n") {
            return Some(Self::Deb);
        }
        if magic.starts_with(&[0x60, 0xEA]) {
            return Some(Self::Arj);
        }
        if magic.starts_with(b"070701") || magic.starts_with(b"070702") || magic.starts_with(b"070707") {
            return Some(Self::Cpio);
        }
        // LZH: "-lh" or "-lz" at offset 2
        if magic.len() >= 7
            && magic[2] == b'-'
            && magic[3] == b'l'
            && (magic[4] == b'h' || magic[4] == b'z')
            && magic[6] == b'-'
        {
            return Some(Self::Lzh);
        }
        // TAR: "ustar" at offset 257
        if magic.len() >= 262 && &magic[257..262] == b"ustar" {
            return Some(Self::Tar);
        }

        None
    }

    /// Check if this is a pure compression stream (single output file).
    pub fn is_stream(&self) -> bool {
        matches!(
            self,
            Self::Gzip
                | Self::Bzip2
                | Self::Xz
                | Self::Lzma
                | Self::Lrzip
                | Self::Lzip
                | Self::Compress
        )
    }

    /// Check if the format has a listing mechanism.
    ///
    /// Streams count: their listing is the synthetic single decompressed
    /// filename. Only formats whose tools cannot enumerate entries without
    /// extracting return false.
    pub fn supports_listing(&self) -> bool {
        !matches!(self, Self::InstallShield)
    }

    /// Check if the format carries package metadata extractable on its own.
    pub fn metadata_capable(&self) -> bool {
        matches!(self, Self::Deb | Self::Gem)
    }

    /// The external binary this format's backend is built around.
    pub fn tool(&self) -> &'static str {
        match self {
            Self::Tar | Self::Gem => "tar",
            Self::Zip => "unzip",
            Self::SevenZip => "7z",
            Self::Cab => "cabextract",
            Self::Rar => "unrar",
            Self::Lzh => "lha",
            Self::Arj => "arj",
            Self::Cpio => "cpio",
            Self::Rpm => "rpm2cpio",
            Self::Deb => "dpkg-deb",
            Self::InstallShield => "unshield",
            Self::Gzip | Self::Compress => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz | Self::Lzma => "xz",
            Self::Lrzip => "lrzip",
            Self::Lzip => "lzip",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tar => write!(f, "TAR"),
            Self::Zip => write!(f, "ZIP"),
            Self::SevenZip => write!(f, "7-Zip"),
            Self::Cab => write!(f, "Cabinet"),
            Self::Rar => write!(f, "RAR"),
            Self::Lzh => write!(f, "LZH"),
            Self::Arj => write!(f, "ARJ"),
            Self::Cpio => write!(f, "cpio"),
            Self::Rpm => write!(f, "RPM"),
            Self::Deb => write!(f, "Debian package"),
            Self::Gem => write!(f, "Ruby gem"),
            Self::InstallShield => write!(f, "InstallShield"),
            Self::Gzip => write!(f, "GZIP"),
            Self::Bzip2 => write!(f, "Bzip2"),
            Self::Xz => write!(f, "XZ"),
            Self::Lzma => write!(f, "LZMA"),
            Self::Lrzip => write!(f, "Lrzip"),
            Self::Lzip => write!(f, "Lzip"),
            Self::Compress => write!(f, "compress"),
        }
    }
}

impl Classification {
    /// Check if the classified file is a pure compression stream.
    pub fn is_stream(&self) -> bool {
        self.compression.is_none() && self.format.is_stream()
    }
}

/// Match a filename against the suffix table: the split point plus the
/// table entry. Case-insensitive. A name that is nothing but a recognized
/// suffix (dotfiles like `.tar.gz`) matches nothing; the longest-first
/// table order makes that check see the whole chain before any shorter
/// trailing piece of it could match.
fn suffix_match(name: &str) -> Option<(usize, Format, Option<Format>)> {
    let lower = name.to_lowercase();
    for (suffix, format, compression) in SUFFIXES {
        if !lower.ends_with(suffix) {
            continue;
        }
        if lower.len() == suffix.len() {
            return None;
        }
        return Some((name.len() - suffix.len(), *format, *compression));
    }
    None
}

fn match_suffix(name: &str) -> Option<(Format, Option<Format>, String)> {
    suffix_match(name).map(|(cut, format, compression)| (format, compression, name[..cut].to_string()))
}

/// Read enough leading bytes for magic detection (262 covers TAR).
fn read_magic(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut magic = vec![0u8; 262];
    let mut filled = 0;
    while filled < magic.len() {
        let n = file.read(&mut magic[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    magic.truncate(filled);
    Ok(magic)
}

/// Classify a file by name, falling back to its signature.
///
/// The one read this performs is the `.cab` disambiguation (Microsoft
/// Cabinet vs InstallShield share the extension) and the no-suffix fallback.
pub fn classify(path: &Path) -> Result<Classification> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::UnknownFormat {
            path: path.to_path_buf(),
        })?;

    if let Some((format, compression, base_name)) = match_suffix(name) {
        let format = if format == Format::Cab {
            match Format::from_magic(&read_magic(path)?) {
                Some(Format::InstallShield) => Format::InstallShield,
                _ => Format::Cab,
            }
        } else {
            format
        };
        return Ok(Classification {
            format,
            compression,
            base_name,
        });
    }

    match Format::from_magic(&read_magic(path)?) {
        Some(format) => Ok(Classification {
            format,
            compression: None,
            base_name: name.to_string(),
        }),
        None => Err(Error::UnknownFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Sniff a file's signature without consulting its name.
pub fn sniff(path: &Path) -> Result<Option<Format>> {
    Ok(Format::from_magic(&read_magic(path)?))
}

/// Strip the recognized suffix from a filename, if any.
pub fn strip_suffixes(name: &str) -> &str {
    match suffix_match(name) {
        Some((cut, _, _)) => &name[..cut],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn classify_name(name: &str) -> Classification {
        // Suffix-only cases never touch the filesystem.
        let path = Path::new(name);
        classify(path).unwrap()
    }

    #[test]
    fn test_simple_suffixes() {
        assert_eq!(classify_name("a.tar").format, Format::Tar);
        assert_eq!(classify_name("a.zip").format, Format::Zip);
        assert_eq!(classify_name("a.7z").format, Format::SevenZip);
        assert_eq!(classify_name("a.rar").format, Format::Rar);
        assert_eq!(classify_name("a.lha").format, Format::Lzh);
        assert_eq!(classify_name("a.arj").format, Format::Arj);
        assert_eq!(classify_name("a.cpio").format, Format::Cpio);
        assert_eq!(classify_name("a.rpm").format, Format::Rpm);
        assert_eq!(classify_name("a.deb").format, Format::Deb);
        assert_eq!(classify_name("a.gem").format, Format::Gem);
        assert_eq!(classify_name("a.gz").format, Format::Gzip);
        assert_eq!(classify_name("a.bz2").format, Format::Bzip2);
        assert_eq!(classify_name("a.xz").format, Format::Xz);
        assert_eq!(classify_name("a.lzma").format, Format::Lzma);
        assert_eq!(classify_name("a.lrz").format, Format::Lrzip);
        assert_eq!(classify_name("a.lz").format, Format::Lzip);
        assert_eq!(classify_name("a.Z").format, Format::Compress);
    }

    #[test]
    fn test_compound_suffixes() {
        for name in ["name.tar.gz", "name.tgz"] {
            let c = classify_name(name);
            assert_eq!(c.format, Format::Tar);
            assert_eq!(c.compression, Some(Format::Gzip));
            assert_eq!(c.base_name, "name");
        }
        let c = classify_name("name.tar.bz2");
        assert_eq!((c.format, c.compression), (Format::Tar, Some(Format::Bzip2)));
        assert_eq!(c.base_name, "name");
        let c = classify_name("name.tar.xz");
        assert_eq!((c.format, c.compression), (Format::Tar, Some(Format::Xz)));
        assert_eq!(c.base_name, "name");
        // .tar.lz must win over plain .lz
        let c = classify_name("name.tar.lz");
        assert_eq!((c.format, c.compression), (Format::Tar, Some(Format::Lzip)));
        let c = classify_name("name.tar.Z");
        assert_eq!((c.format, c.compression), (Format::Tar, Some(Format::Compress)));
    }

    #[test]
    fn test_base_name_keeps_inner_dots() {
        assert_eq!(classify_name("pkg-7.1.tar.gz").base_name, "pkg-7.1");
        assert_eq!(classify_name("data.bin.gz").base_name, "data.bin");
    }

    #[test]
    fn test_streams_vs_containers() {
        assert!(classify_name("a.gz").is_stream());
        assert!(!classify_name("a.tar.gz").is_stream());
        assert!(!classify_name("a.zip").is_stream());
    }

    #[test]
    fn test_unknown_extension_unreadable_file() {
        assert!(classify(Path::new("/no/such/file.wat")).is_err());
    }

    #[test]
    fn test_magic_fallback() {
        let dir = tempdir("magic");
        let path = dir.join("blob");
        fs::write(&path, [0x1F, 0x8B, 0x08, 0x00]).unwrap();
        let c = classify(&path).unwrap();
        assert_eq!(c.format, Format::Gzip);
        assert_eq!(c.base_name, "blob");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cab_signature_split() {
        let dir = tempdir("cab");
        let ms = dir.join("ms.cab");
        fs::write(&ms, b"MSCF\x00\x00\x00\x00").unwrap();
        assert_eq!(classify(&ms).unwrap().format, Format::Cab);
        let is = dir.join("is.cab");
        fs::write(&is, b"ISc(\x00\x00\x00\x00").unwrap();
        assert_eq!(classify(&is).unwrap().format, Format::InstallShield);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_magic_table() {
        assert_eq!(Format::from_magic(&[0x50, 0x4B, 0x03, 0x04]), Some(Format::Zip));
        assert_eq!(Format::from_magic(b"Rar!\x1a\x07"), Some(Format::Rar));
        assert_eq!(Format::from_magic(&[0xED, 0xAB, 0xEE, 0xDB]), Some(Format::Rpm));
        assert_eq!(Format::from_magic(b"!<arch>\ndebian"), Some(Format::Deb));
        assert_eq!(Format::from_magic(b"070701rest"), Some(Format::Cpio));
        assert_eq!(Format::from_magic(&[0x00, 0x00, 0x00, 0x00]), None);
        let mut tar = vec![0u8; 262];
        tar[257..262].copy_from_slice(b"ustar");
        assert_eq!(Format::from_magic(&tar), Some(Format::Tar));
    }

    #[test]
    fn test_format_properties() {
        assert!(Format::Gzip.is_stream());
        assert!(!Format::Tar.is_stream());
        assert!(Format::Deb.metadata_capable());
        assert!(Format::Gem.metadata_capable());
        assert!(!Format::Zip.metadata_capable());
        assert!(!Format::InstallShield.supports_listing());
        assert!(Format::Arj.supports_listing());
        assert!(Format::Gzip.supports_listing());
    }

    #[test]
    fn test_strip_suffixes() {
        assert_eq!(strip_suffixes("foo.tar.gz"), "foo");
        assert_eq!(strip_suffixes("foo.zip"), "foo");
        assert_eq!(strip_suffixes("foo"), "foo");
        // Names that are nothing but a suffix stay intact, at every
        // length of the chain.
        assert_eq!(strip_suffixes(".tar.gz"), ".tar.gz");
        assert_eq!(strip_suffixes(".gz"), ".gz");
        assert_eq!(strip_suffixes(".tgz"), ".tgz");
    }

    #[test]
    fn test_dotfile_classified_by_magic() {
        let dir = tempdir("dotfile");
        let path = dir.join(".tar.gz");
        fs::write(&path, [0x1F, 0x8B, 0x08, 0x00]).unwrap();
        let c = classify(&path).unwrap();
        assert_eq!(c.format, Format::Gzip);
        assert_eq!(c.compression, None);
        assert_eq!(c.base_name, ".tar.gz");
        fs::remove_dir_all(&dir).unwrap();
    }

    fn tempdir(label: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "oxtract-format-test-{label}-{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}
