//! # Codec Registry Module
//!
//! Questo modulo mappa una modalità di output (più un parametro di qualità
//! opzionale) su un codec concreto con la sua policy di gestione estensioni.
//!
//! ## Responsabilità:
//! - Definisce l'enum `OutputMode` (insieme chiuso di modalità supportate)
//! - Risolve modalità + qualità in un `Codec` pronto all'uso
//! - Implementa le operazioni di compressione delegando alle librerie codec
//!
//! ## Modalità supportate:
//! | Modalità          | Estensione | Policy   | Default qualità |
//! |-------------------|------------|----------|-----------------|
//! | Jpeg              | jpg        | Replace  | 98              |
//! | Png               | png        | Replace  | (ignorata)      |
//! | Webp              | webp       | Replace  | 75              |
//! | WebpLossless      | webp       | Replace  | 75              |
//! | Brotli            | br         | Append   | 4 (level)       |
//! | BrotliDecompress  | br         | Remove   | (ignorata)      |
//!
//! ## Delega alle librerie:
//! - JPEG/PNG: crate `image` (decode + re-encode)
//! - WebP lossy/lossless: crate `webp` (il crate `image` scrive solo lossless)
//! - Brotli: crate `brotli` (stream compress/decompress)
//!
//! I codec non hanno stato mutabile oltre la qualità configurata: sono
//! economici da costruire per ogni file e sicuri da usare in parallelo.

use crate::error::CompressError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Default JPEG quality when the request does not specify one
pub const DEFAULT_JPEG_QUALITY: u8 = 98;
/// Default WebP quality (lossy and lossless) when the request does not specify one
pub const DEFAULT_WEBP_QUALITY: u8 = 75;
/// Default Brotli compression level when the request does not specify one
pub const DEFAULT_BROTLI_LEVEL: u8 = 4;

/// The closed set of supported output modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMode {
    Jpeg,
    Png,
    Webp,
    WebpLossless,
    Brotli,
    BrotliDecompress,
}

impl OutputMode {
    /// Parse a mode name as accepted on the CLI and in config files.
    ///
    /// Unknown names fail with [`CompressError::UnsupportedMode`].
    pub fn parse(s: &str) -> Result<Self, CompressError> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            "webp-lossless" | "webpll" => Ok(Self::WebpLossless),
            "brotli" => Ok(Self::Brotli),
            "brotli-decompress" | "unbrotli" => Ok(Self::BrotliDecompress),
            other => Err(CompressError::UnsupportedMode(other.to_string())),
        }
    }
}

impl FromStr for OutputMode {
    type Err = CompressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// How the output file name is derived from the input file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionHandling {
    /// Concatenate `.` + extension onto the existing name (`photo.bmp` -> `photo.bmp.br`)
    Append,
    /// Substitute the existing extension (`photo.bmp` -> `photo.jpg`)
    Replace,
    /// Strip the existing extension (`photo.bmp.br` -> `photo.bmp`)
    Remove,
}

/// A resolved codec: output mode plus its effective quality parameter
#[derive(Debug, Clone)]
pub struct Codec {
    kind: CodecKind,
}

#[derive(Debug, Clone)]
enum CodecKind {
    Jpeg { quality: u8 },
    Png,
    Webp { quality: u8, lossless: bool },
    Brotli { level: u8 },
    BrotliDecompress,
}

impl Codec {
    /// Resolve an output mode and optional quality into a concrete codec.
    ///
    /// Pure and total over [`OutputMode`]; absent quality falls back to the
    /// per-codec default constant.
    pub fn resolve(mode: OutputMode, quality: Option<u8>) -> Self {
        let kind = match mode {
            OutputMode::Jpeg => CodecKind::Jpeg {
                quality: quality.unwrap_or(DEFAULT_JPEG_QUALITY),
            },
            OutputMode::Png => CodecKind::Png,
            OutputMode::Webp => CodecKind::Webp {
                quality: quality.unwrap_or(DEFAULT_WEBP_QUALITY),
                lossless: false,
            },
            OutputMode::WebpLossless => CodecKind::Webp {
                quality: quality.unwrap_or(DEFAULT_WEBP_QUALITY),
                lossless: true,
            },
            OutputMode::Brotli => CodecKind::Brotli {
                level: quality.unwrap_or(DEFAULT_BROTLI_LEVEL),
            },
            OutputMode::BrotliDecompress => CodecKind::BrotliDecompress,
        };

        Self { kind }
    }

    /// Extension-handling policy for this codec
    pub fn extension_handling(&self) -> ExtensionHandling {
        match self.kind {
            CodecKind::Jpeg { .. } | CodecKind::Png | CodecKind::Webp { .. } => {
                ExtensionHandling::Replace
            }
            CodecKind::Brotli { .. } => ExtensionHandling::Append,
            CodecKind::BrotliDecompress => ExtensionHandling::Remove,
        }
    }

    /// File extension this codec writes (or removes, for decompression)
    pub fn file_extension(&self) -> &'static str {
        match self.kind {
            CodecKind::Jpeg { .. } => "jpg",
            CodecKind::Png => "png",
            CodecKind::Webp { .. } => "webp",
            CodecKind::Brotli { .. } | CodecKind::BrotliDecompress => "br",
        }
    }

    /// Perform the whole-file transformation from `in_path` to `out_path`.
    ///
    /// Synchronous and non-cancelable; every stream is closed on all exit
    /// paths by RAII.
    pub fn compress(&self, in_path: &Path, out_path: &Path) -> Result<(), CompressError> {
        match &self.kind {
            CodecKind::Jpeg { quality } => {
                // JPEG has no alpha channel, force RGB before encoding
                let rgb = image::open(in_path)?.into_rgb8();
                let mut writer = BufWriter::new(File::create(out_path)?);
                let mut encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, *quality);
                encoder.encode_image(&rgb)?;
                writer.flush()?;
                Ok(())
            }
            CodecKind::Png => {
                let img = image::open(in_path)?;
                let mut writer = BufWriter::new(File::create(out_path)?);
                img.write_with_encoder(image::codecs::png::PngEncoder::new(&mut writer))?;
                writer.flush()?;
                Ok(())
            }
            CodecKind::Webp { quality, lossless } => {
                let rgba = image::open(in_path)?.into_rgba8();
                let encoder = webp::Encoder::from_rgba(&rgba, rgba.width(), rgba.height());
                let encoded = encoder
                    .encode_simple(*lossless, f32::from(*quality))
                    .map_err(|e| CompressError::WebpEncode(format!("{e:?}")))?;
                std::fs::write(out_path, &*encoded)?;
                Ok(())
            }
            CodecKind::Brotli { level } => {
                let mut input = File::open(in_path)?;
                let output = File::create(out_path)?;
                let mut writer =
                    brotli::CompressorWriter::new(output, 4096, u32::from(*level), 22);
                io::copy(&mut input, &mut writer)?;
                writer.flush()?;
                Ok(())
            }
            CodecKind::BrotliDecompress => {
                let input = File::open(in_path)?;
                let mut reader = brotli::Decompressor::new(input, 4096);
                let mut output = File::create(out_path)?;
                io::copy(&mut reader, &mut output)?;
                output.flush()?;
                Ok(())
            }
        }
    }
}
