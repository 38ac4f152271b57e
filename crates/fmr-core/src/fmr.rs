//! Finger Minutiae Record: the top-level container, four header dialects.
//!
//! Ported from `fmr.c`. Header parsing dispatches purely on the caller's
//! explicit [`FormatStd`] — no magic sniffing. After the header, `num_views`
//! FVMRs are decoded; if the last one truncates inside its FEDB the FMR is
//! still returned, tagged `truncated`, so a caller can salvage a partial
//! transaction (spec §4.10's `END_PARTIAL` state).

use crate::error::FmrError;
use crate::format::{FormatStd, ANSI_HDR_LARGE_LEN, ANSI_HDR_SMALL_LEN, ANSI07_HDR_LEN, FORMAT_ID, ISO_HDR_LEN};
use crate::fvmr::Fvmr;
use bytes_io::{ByteSink, ByteSource};
use log::{debug, warn};

/// Image/resolution metadata carried by the ANSI/ISO full-record header
/// (absent on card formats and on the per-FVMR ANSI-2007 layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageMetadata {
    pub x_image_size: u16,
    pub y_image_size: u16,
    pub x_resolution: u16,
    pub y_resolution: u16,
}

/// ANSI-only Common Biometric Exchange Formats Framework owner/type pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cbeff {
    pub owner: u16,
    pub product_type: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fmr {
    pub format_std: FormatStd,
    pub format_id: [u8; 4],
    pub spec_version: [u8; 4],
    pub record_length: u32,
    pub cbeff: Option<Cbeff>,
    /// `(sval >> 12) & 0xF`; bit 3 signals Appendix F conformance.
    pub compliance: u8,
    /// `sval & 0x0FFF`.
    pub scanner_id: u16,
    pub image: Option<ImageMetadata>,
    pub num_views: u8,
    pub reserved: u8,
    pub fvmrs: Vec<Fvmr>,
    /// Set when the last FVMR's FEDB hit end-of-data; a salvaged prefix is
    /// still attached (spec §4.5, §8 property 6).
    pub truncated: bool,
}

impl Fmr {
    pub fn appendix_f_conformant(&self) -> bool {
        self.compliance & 0b1000 != 0
    }

    pub fn decode(src: &mut dyn ByteSource, format_std: FormatStd) -> Result<Self, FmrError> {
        debug!("decoding FMR dialect={format_std:?}");
        match format_std {
            FormatStd::Ansi => Self::decode_ansi(src, format_std),
            FormatStd::Iso => Self::decode_iso(src, format_std),
            FormatStd::Ansi07 => Self::decode_ansi07(src, format_std),
            FormatStd::IsoNormalCard | FormatStd::IsoCompactCard => {
                Self::decode_card(src, format_std)
            }
        }
    }

    fn read_magic(src: &mut dyn ByteSource) -> Result<([u8; 4], [u8; 4]), FmrError> {
        let id = src.read_bytes(4)?;
        let version = src.read_bytes(4)?;
        let format_id: [u8; 4] = id.try_into().unwrap();
        let spec_version: [u8; 4] = version.try_into().unwrap();
        Ok((format_id, spec_version))
    }

    fn decode_ansi(src: &mut dyn ByteSource, format_std: FormatStd) -> Result<Self, FmrError> {
        let (format_id, spec_version) = Self::read_magic(src)?;
        let short_len = src.read_u16_be()?;
        let record_length = if short_len == 0 {
            src.read_u32_be()?
        } else {
            short_len as u32
        };
        let owner = src.read_u16_be()?;
        let product_type = src.read_u16_be()?;
        let sval = src.read_u16_be()?;
        let x_image_size = src.read_u16_be()?;
        let y_image_size = src.read_u16_be()?;
        let x_resolution = src.read_u16_be()?;
        let y_resolution = src.read_u16_be()?;
        let num_views = src.read_u8()?;
        let reserved = src.read_u8()?;

        let (fvmrs, truncated) = Self::decode_views(src, format_std, num_views, None)?;

        Ok(Fmr {
            format_std,
            format_id,
            spec_version,
            record_length,
            cbeff: Some(Cbeff { owner, product_type }),
            compliance: ((sval >> 12) & 0xF) as u8,
            scanner_id: sval & 0x0FFF,
            image: Some(ImageMetadata { x_image_size, y_image_size, x_resolution, y_resolution }),
            num_views,
            reserved,
            fvmrs,
            truncated,
        })
    }

    fn decode_iso(src: &mut dyn ByteSource, format_std: FormatStd) -> Result<Self, FmrError> {
        let (format_id, spec_version) = Self::read_magic(src)?;
        let record_length = src.read_u32_be()?;
        let sval = src.read_u16_be()?;
        let x_image_size = src.read_u16_be()?;
        let y_image_size = src.read_u16_be()?;
        let x_resolution = src.read_u16_be()?;
        let y_resolution = src.read_u16_be()?;
        let num_views = src.read_u8()?;
        let reserved = src.read_u8()?;

        let (fvmrs, truncated) = Self::decode_views(src, format_std, num_views, None)?;

        Ok(Fmr {
            format_std,
            format_id,
            spec_version,
            record_length,
            cbeff: None,
            compliance: ((sval >> 12) & 0xF) as u8,
            scanner_id: sval & 0x0FFF,
            image: Some(ImageMetadata { x_image_size, y_image_size, x_resolution, y_resolution }),
            num_views,
            reserved,
            fvmrs,
            truncated,
        })
    }

    fn decode_ansi07(src: &mut dyn ByteSource, format_std: FormatStd) -> Result<Self, FmrError> {
        let (format_id, spec_version) = Self::read_magic(src)?;
        let record_length = src.read_u32_be()?;
        let owner = src.read_u16_be()?;
        let product_type = src.read_u16_be()?;
        let sval = src.read_u16_be()?;
        let num_views = src.read_u8()?;
        let reserved = src.read_u8()?;

        let (fvmrs, truncated) = Self::decode_views(src, format_std, num_views, None)?;

        Ok(Fmr {
            format_std,
            format_id,
            spec_version,
            record_length,
            cbeff: Some(Cbeff { owner, product_type }),
            compliance: ((sval >> 12) & 0xF) as u8,
            scanner_id: sval & 0x0FFF,
            image: None,
            num_views,
            reserved,
            fvmrs,
            truncated,
        })
    }

    fn decode_card(src: &mut dyn ByteSource, format_std: FormatStd) -> Result<Self, FmrError> {
        let remaining = src.remaining().unwrap_or(0) as usize;
        let (fvmrs, truncated) =
            Self::decode_views(src, format_std, 1, Some(remaining))?;
        let num_minutiae: usize = fvmrs.iter().map(|v| v.number_of_minutiae()).sum();
        let record_length = (num_minutiae * format_std.fmd_len()) as u32;

        Ok(Fmr {
            format_std,
            format_id: *FORMAT_ID,
            spec_version: *format_std.spec_version(),
            record_length,
            cbeff: None,
            compliance: 0,
            scanner_id: 0,
            image: None,
            num_views: 1,
            reserved: 0,
            fvmrs,
            truncated,
        })
    }

    fn decode_views(
        src: &mut dyn ByteSource,
        format_std: FormatStd,
        num_views: u8,
        card_body_remaining: Option<usize>,
    ) -> Result<(Vec<Fvmr>, bool), FmrError> {
        let mut fvmrs = Vec::with_capacity(num_views as usize);
        for _ in 0..num_views {
            match Fvmr::decode(src, format_std, card_body_remaining) {
                Ok(fvmr) => {
                    let partial = fvmr.partial;
                    fvmrs.push(fvmr);
                    if partial {
                        warn!("truncated read inside FEDB, salvaging partial FVMR");
                        return Ok((fvmrs, true));
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok((fvmrs, false))
    }

    pub fn encode(&self, sink: &mut dyn ByteSink) -> Result<(), FmrError> {
        match self.format_std {
            FormatStd::IsoNormalCard | FormatStd::IsoCompactCard => {
                for fvmr in &self.fvmrs {
                    fvmr.encode(sink)?;
                }
            }
            FormatStd::Ansi => {
                sink.write_bytes(&self.format_id)?;
                sink.write_bytes(&self.spec_version)?;
                if self.record_length <= u16::MAX as u32 {
                    sink.write_u16_be(self.record_length as u16)?;
                } else {
                    sink.write_u16_be(0)?;
                    sink.write_u32_be(self.record_length)?;
                }
                let cbeff = self.cbeff.unwrap_or_default();
                sink.write_u16_be(cbeff.owner)?;
                sink.write_u16_be(cbeff.product_type)?;
                sink.write_u16_be(self.packed_compliance())?;
                let img = self.image.unwrap_or_default();
                sink.write_u16_be(img.x_image_size)?;
                sink.write_u16_be(img.y_image_size)?;
                sink.write_u16_be(img.x_resolution)?;
                sink.write_u16_be(img.y_resolution)?;
                sink.write_u8(self.num_views)?;
                sink.write_u8(self.reserved)?;
                for fvmr in &self.fvmrs {
                    fvmr.encode(sink)?;
                }
            }
            FormatStd::Iso => {
                sink.write_bytes(&self.format_id)?;
                sink.write_bytes(&self.spec_version)?;
                sink.write_u32_be(self.record_length)?;
                sink.write_u16_be(self.packed_compliance())?;
                let img = self.image.unwrap_or_default();
                sink.write_u16_be(img.x_image_size)?;
                sink.write_u16_be(img.y_image_size)?;
                sink.write_u16_be(img.x_resolution)?;
                sink.write_u16_be(img.y_resolution)?;
                sink.write_u8(self.num_views)?;
                sink.write_u8(self.reserved)?;
                for fvmr in &self.fvmrs {
                    fvmr.encode(sink)?;
                }
            }
            FormatStd::Ansi07 => {
                sink.write_bytes(&self.format_id)?;
                sink.write_bytes(&self.spec_version)?;
                sink.write_u32_be(self.record_length)?;
                let cbeff = self.cbeff.unwrap_or_default();
                sink.write_u16_be(cbeff.owner)?;
                sink.write_u16_be(cbeff.product_type)?;
                sink.write_u16_be(self.packed_compliance())?;
                sink.write_u8(self.num_views)?;
                sink.write_u8(self.reserved)?;
                for fvmr in &self.fvmrs {
                    fvmr.encode(sink)?;
                }
            }
        }
        Ok(())
    }

    fn packed_compliance(&self) -> u16 {
        (((self.compliance & 0xF) as u16) << 12) | (self.scanner_id & 0x0FFF)
    }

    fn min_header_len(&self) -> usize {
        match self.format_std {
            FormatStd::Ansi => ANSI_HDR_SMALL_LEN.min(ANSI_HDR_LARGE_LEN),
            FormatStd::Iso => ISO_HDR_LEN,
            FormatStd::Ansi07 => ANSI07_HDR_LEN,
            FormatStd::IsoNormalCard | FormatStd::IsoCompactCard => 0,
        }
    }

    /// Full conformance pass: header magic/version/length, CBEFF owner
    /// (ANSI only, unless `minex_profile` disables the check), resolution
    /// presence, reserved bits, each FVMR, and finger-position view-number
    /// monotonicity across all FVMRs (spec §4.4, §4.5, §8 property 5).
    pub fn validate(&self, minex_profile: bool) -> Result<(), FmrError> {
        if self.format_std.has_record_header() {
            if &self.format_id != FORMAT_ID {
                return Err(FmrError::Invalid(format!(
                    "format_id {:?} does not match magic {:?}",
                    self.format_id, FORMAT_ID
                )));
            }
            if &self.spec_version != self.format_std.spec_version() {
                return Err(FmrError::Invalid(format!(
                    "spec_version {:?} does not match expected {:?}",
                    self.spec_version,
                    self.format_std.spec_version()
                )));
            }
            if (self.record_length as usize) < self.min_header_len() {
                return Err(FmrError::Invalid(format!(
                    "record_length {} below minimum header length {}",
                    self.record_length,
                    self.min_header_len()
                )));
            }
            if self.reserved != 0 {
                return Err(FmrError::Invalid("header reserved byte non-zero".into()));
            }
            if matches!(self.format_std, FormatStd::Ansi) && !minex_profile {
                if self.cbeff.map(|c| c.owner).unwrap_or(0) == 0 {
                    return Err(FmrError::Invalid("CBEFF owner must be non-zero".into()));
                }
            }
            if matches!(self.format_std, FormatStd::Ansi | FormatStd::Iso) {
                let img = self.image.unwrap_or_default();
                if img.x_resolution == 0 || img.y_resolution == 0 {
                    return Err(FmrError::Invalid("x_resolution/y_resolution must be > 0".into()));
                }
            }
        }

        let (image_width, image_height) = self
            .image
            .map(|i| (Some(i.x_image_size), Some(i.y_image_size)))
            .unwrap_or((None, None));

        let mut next_min_view = [0u8; 16];
        for fvmr in &self.fvmrs {
            fvmr.validate(image_width, image_height)?;
            if self.format_std.has_fvmr_header() {
                let pos = fvmr.finger_number as usize;
                if pos < next_min_view.len() {
                    if fvmr.view_number < next_min_view[pos] {
                        return Err(FmrError::Invalid(format!(
                            "finger {} view {} is below minimum expected view {} (monotonicity gap)",
                            pos, fvmr.view_number, next_min_view[pos]
                        )));
                    }
                    next_min_view[pos] = fvmr.view_number + 1;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fed::Fedb;
    use crate::fmd::{Fmd, MinutiaType};
    use bytes_io::{BufferSink, BufferSource};

    fn minutia(minutia_type: MinutiaType, x: u16, y: u16, angle: u8, quality: u8) -> Fmd {
        Fmd { format_std: FormatStd::Ansi, minutia_type, x, y, angle, quality, reserved: 0 }
    }

    fn s1_fmr() -> Fmr {
        Fmr {
            format_std: FormatStd::Ansi,
            format_id: *FORMAT_ID,
            spec_version: *b" 20\0",
            record_length: 0x32,
            cbeff: Some(Cbeff { owner: 0x001B, product_type: 0x0201 }),
            compliance: 0,
            scanner_id: 0,
            image: Some(ImageMetadata { x_image_size: 500, y_image_size: 500, x_resolution: 197, y_resolution: 197 }),
            num_views: 1,
            reserved: 0,
            fvmrs: vec![Fvmr {
                format_std: FormatStd::Ansi,
                finger_number: 1,
                view_number: 0,
                impression_type: 0,
                finger_quality: 50,
                ansi07_image: None,
                fmds: vec![
                    minutia(MinutiaType::RidgeEnding, 100, 120, 45, 80),
                    minutia(MinutiaType::Bifurcation, 200, 240, 90, 60),
                ],
                fedb: Fedb::default(),
                partial: false,
            }],
            truncated: false,
        }
    }

    #[test]
    fn s1_ansi378_single_view_roundtrip_and_valid() {
        let fmr = s1_fmr();
        let mut sink = BufferSink::new();
        fmr.encode(&mut sink).unwrap();
        let bytes = sink.into_inner();

        let mut src = BufferSource::new(&bytes);
        let decoded = Fmr::decode(&mut src, FormatStd::Ansi).unwrap();
        assert_eq!(decoded, fmr);
        assert!(decoded.validate(false).is_ok());

        let mut re_sink = BufferSink::new();
        decoded.encode(&mut re_sink).unwrap();
        assert_eq!(re_sink.into_inner(), bytes);
    }

    #[test]
    fn s3_view_number_gap_is_invalid_but_decodes() {
        let mut fmr = s1_fmr();
        fmr.num_views = 2;
        fmr.fvmrs[0].finger_number = 2;
        let mut second = fmr.fvmrs[0].clone();
        second.view_number = 2; // gap: expected 1
        fmr.fvmrs.push(second);

        assert!(fmr.validate(false).is_err());
    }

    #[test]
    fn s4_truncation_marks_last_fvmr_partial() {
        let fmr = s1_fmr();
        let mut sink = BufferSink::new();
        fmr.encode(&mut sink).unwrap();
        let mut bytes = sink.into_inner();
        // truncate mid-FEDB declaration (drop the trailing 2-byte block_length field)
        bytes.truncate(bytes.len() - 1);

        let mut src = BufferSource::new(&bytes);
        let result = Fmr::decode(&mut src, FormatStd::Ansi);
        let decoded = result.unwrap();
        assert!(decoded.truncated);
        assert!(decoded.fvmrs.last().unwrap().partial);
    }
}
