//! Finger Minutia Datum: per-minutia binary encode/decode in four dialects.
//!
//! Ported from `fmd.c`. Bit-packing is identical across ANSI-378, ANSI-2007,
//! ISO full, and ISO normal-card (6 bytes, quality implicit zero on the
//! normal-card variant); ISO compact-card packs 3 bytes with no reserved
//! field and an unknown quality.

use crate::error::FmrError;
use crate::format::FormatStd;
use bytes_io::{ByteSink, ByteSource};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Minutia quality sentinel: quality was not computed.
pub const QUALITY_UNDEFINED: u8 = 254;
/// Minutia quality sentinel: quality was not reported by the capture device.
pub const QUALITY_NOT_REPORTED: u8 = 255;
/// Quality byte stored by the ISO compact-card dialect, which has no quality field.
pub const QUALITY_UNKNOWN_COMPACT: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum MinutiaType {
    Other = 0,
    RidgeEnding = 1,
    Bifurcation = 2,
}

/// A single minutia point, owned by one FVMR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fmd {
    pub format_std: FormatStd,
    pub minutia_type: MinutiaType,
    pub x: u16,
    pub y: u16,
    /// Angle in dialect-specific units; the on-disk value is unitless.
    pub angle: u8,
    pub quality: u8,
    /// Retained verbatim for conformance checks (the 2-bit reserved field
    /// ahead of `y` in the 6-byte dialects; always 0 on compact-card).
    pub reserved: u8,
}

impl Fmd {
    pub fn decode(src: &mut dyn ByteSource, format_std: FormatStd) -> Result<Self, FmrError> {
        match format_std {
            FormatStd::IsoCompactCard => Self::decode_compact(src, format_std),
            FormatStd::IsoNormalCard => Self::decode_wide(src, format_std, false),
            _ => Self::decode_wide(src, format_std, true),
        }
    }

    fn decode_wide(
        src: &mut dyn ByteSource,
        format_std: FormatStd,
        has_quality: bool,
    ) -> Result<Self, FmrError> {
        let w0 = src.read_u16_be()?;
        let w1 = src.read_u16_be()?;
        let angle = src.read_u8()?;
        let quality = if has_quality { src.read_u8()? } else { 0 };

        let minutia_type = MinutiaType::try_from(((w0 >> 14) & 0x3) as u8)
            .map_err(|_| FmrError::Malformed(format!("bad minutia type in word {w0:#06x}")))?;
        let x = w0 & 0x3FFF;
        let reserved = ((w1 >> 14) & 0x3) as u8;
        let y = w1 & 0x3FFF;

        Ok(Fmd {
            format_std,
            minutia_type,
            x,
            y,
            angle,
            quality,
            reserved,
        })
    }

    fn decode_compact(src: &mut dyn ByteSource, format_std: FormatStd) -> Result<Self, FmrError> {
        let x = src.read_u8()? as u16;
        let y = src.read_u8()? as u16;
        let packed = src.read_u8()?;
        let minutia_type = MinutiaType::try_from((packed >> 6) & 0x3)
            .map_err(|_| FmrError::Malformed(format!("bad minutia type in byte {packed:#04x}")))?;
        let angle = packed & 0x3F;

        Ok(Fmd {
            format_std,
            minutia_type,
            x,
            y,
            angle,
            quality: QUALITY_UNKNOWN_COMPACT,
            reserved: 0,
        })
    }

    pub fn encode(&self, sink: &mut dyn ByteSink) -> Result<(), FmrError> {
        match self.format_std {
            FormatStd::IsoCompactCard => self.encode_compact(sink),
            FormatStd::IsoNormalCard => self.encode_wide(sink, false),
            _ => self.encode_wide(sink, true),
        }
    }

    fn encode_wide(&self, sink: &mut dyn ByteSink, has_quality: bool) -> Result<(), FmrError> {
        let type_bits: u8 = self.minutia_type.into();
        let w0 = ((type_bits as u16) << 14) | (self.x & 0x3FFF);
        let w1 = (((self.reserved & 0x3) as u16) << 14) | (self.y & 0x3FFF);
        sink.write_u16_be(w0)?;
        sink.write_u16_be(w1)?;
        sink.write_u8(self.angle)?;
        if has_quality {
            sink.write_u8(self.quality)?;
        }
        Ok(())
    }

    fn encode_compact(&self, sink: &mut dyn ByteSink) -> Result<(), FmrError> {
        let type_bits: u8 = self.minutia_type.into();
        sink.write_u8(self.x as u8)?;
        sink.write_u8(self.y as u8)?;
        sink.write_u8((type_bits << 6) | (self.angle & 0x3F))?;
        Ok(())
    }

    /// Angle converted to degrees for display/comparison. The on-disk value
    /// stays unitless; the validator compares raw integers, never the
    /// converted angle.
    pub fn angle_degrees(&self) -> f64 {
        match self.format_std {
            FormatStd::Ansi | FormatStd::Ansi07 => self.angle as f64 * 2.0,
            FormatStd::IsoCompactCard => self.angle as f64 * (360.0 / 64.0),
            FormatStd::Iso | FormatStd::IsoNormalCard => self.angle as f64 * (360.0 / 256.0),
        }
    }

    /// Validate coordinate/type/reserved/angle/quality domain rules (spec §4.2).
    /// Card formats skip coordinate and reserved checks; `image_width`/
    /// `image_height` come from the enclosing FVMR → FMR.
    pub fn validate(
        &self,
        image_width: Option<u16>,
        image_height: Option<u16>,
    ) -> Result<(), FmrError> {
        if self.format_std.validates_coordinates() {
            if let Some(w) = image_width {
                if w > 0 && self.x > w - 1 {
                    return Err(FmrError::Invalid(format!(
                        "minutia x={} exceeds image width {}",
                        self.x, w
                    )));
                }
            }
            if let Some(h) = image_height {
                if h > 0 && self.y > h - 1 {
                    return Err(FmrError::Invalid(format!(
                        "minutia y={} exceeds image height {}",
                        self.y, h
                    )));
                }
            }
            if self.reserved != 0 {
                return Err(FmrError::Invalid(format!(
                    "reserved bits non-zero: {}",
                    self.reserved
                )));
            }
            if matches!(self.format_std, FormatStd::Ansi | FormatStd::Ansi07) && self.angle > 179
            {
                return Err(FmrError::Invalid(format!(
                    "angle {} out of range 0..179",
                    self.angle
                )));
            }
        }
        if self.quality > 100
            && self.quality != QUALITY_UNDEFINED
            && self.quality != QUALITY_NOT_REPORTED
            && self.quality != QUALITY_UNKNOWN_COMPACT
        {
            return Err(FmrError::Invalid(format!(
                "quality {} out of range 0..100",
                self.quality
            )));
        }
        Ok(())
    }
}
