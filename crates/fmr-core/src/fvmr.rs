//! Finger View Minutiae Record: owns a sequence of FMDs and at most one FEDB.
//!
//! Ported from `fvmr.c`. Header shape differs across dialects; the two card
//! formats have no FVMR header at all and compute `number_of_minutiae` from
//! however many FMDs fit before the enclosing FMR's declared body ends.

use crate::error::FmrError;
use crate::fed::Fedb;
use crate::fmd::Fmd;
use crate::format::FormatStd;
use bytes_io::{ByteSink, ByteSource, IoError};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Capture modality (spec §6 "Impression type set"). `LatentLift` is a
/// recognized wire value the FMR validator does not accept (spec §4.4's
/// validator set is the narrower `{0,1,2,3,8,9}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ImpressionType {
    LiveScanPlain = 0,
    LiveScanRolled = 1,
    NonLiveScanPlain = 2,
    NonLiveScanRolled = 3,
    LatentLift = 7,
    Swipe = 8,
    LiveScanContactless = 9,
}

impl ImpressionType {
    /// Whether the FMR validator's narrower set accepts this value.
    pub fn fmr_validator_accepts(self) -> bool {
        !matches!(self, ImpressionType::LatentLift)
    }
}

/// Per-dialect image metadata carried inline on ANSI-2007 FVMRs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ansi07Image {
    pub algorithm_id: u32,
    pub x_image_size: u16,
    pub y_image_size: u16,
    pub x_resolution: u16,
    pub y_resolution: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fvmr {
    pub format_std: FormatStd,
    pub finger_number: u8,
    pub view_number: u8,
    pub impression_type: u8,
    pub finger_quality: u8,
    pub ansi07_image: Option<Ansi07Image>,
    pub fmds: Vec<Fmd>,
    pub fedb: Fedb,
    /// Set when end-of-data occurred while reading this FVMR's FEDB; the
    /// FVMR is still attached to the owning FMR (spec §4.5).
    pub partial: bool,
}

impl Fvmr {
    pub fn number_of_minutiae(&self) -> usize {
        self.fmds.len()
    }

    /// Decode one FVMR. `declared_minutiae` is `Some(n)` for header-bearing
    /// dialects; for the two card dialects it is `None` and FMDs are read
    /// until `remaining_body` bytes are exhausted.
    pub fn decode(
        src: &mut dyn ByteSource,
        format_std: FormatStd,
        card_body_remaining: Option<usize>,
    ) -> Result<Self, FmrError> {
        match format_std {
            FormatStd::IsoNormalCard | FormatStd::IsoCompactCard => {
                Self::decode_card(src, format_std, card_body_remaining.unwrap_or(0))
            }
            FormatStd::Ansi07 => Self::decode_ansi07(src, format_std),
            FormatStd::Ansi | FormatStd::Iso => Self::decode_standard(src, format_std),
        }
    }

    fn decode_standard(src: &mut dyn ByteSource, format_std: FormatStd) -> Result<Self, FmrError> {
        let finger_number = src.read_u8()?;
        let packed = src.read_u8()?;
        let view_number = packed >> 4;
        let impression_type = packed & 0x0F;
        let finger_quality = src.read_u8()?;
        let count = src.read_u8()? as usize;

        let (fmds, partial) = Self::decode_fmds(src, format_std, count)?;
        let (fedb, fedb_partial) = if partial {
            (Fedb::default(), true)
        } else {
            Fedb::decode(src, format_std)?
        };

        Ok(Fvmr {
            format_std,
            finger_number,
            view_number,
            impression_type,
            finger_quality,
            ansi07_image: None,
            fmds,
            fedb,
            partial: partial || fedb_partial,
        })
    }

    fn decode_ansi07(src: &mut dyn ByteSource, format_std: FormatStd) -> Result<Self, FmrError> {
        let finger_number = src.read_u8()?;
        let view_number = src.read_u8()?;
        let impression_type = src.read_u8()?;
        let finger_quality = src.read_u8()?;
        let algorithm_id = src.read_u32_be()?;
        let x_image_size = src.read_u16_be()?;
        let y_image_size = src.read_u16_be()?;
        let x_resolution = src.read_u16_be()?;
        let y_resolution = src.read_u16_be()?;
        let count = src.read_u8()? as usize;

        let (fmds, partial) = Self::decode_fmds(src, format_std, count)?;
        let (fedb, fedb_partial) = if partial {
            (Fedb::default(), true)
        } else {
            Fedb::decode(src, format_std)?
        };

        Ok(Fvmr {
            format_std,
            finger_number,
            view_number,
            impression_type,
            finger_quality,
            ansi07_image: Some(Ansi07Image {
                algorithm_id,
                x_image_size,
                y_image_size,
                x_resolution,
                y_resolution,
            }),
            fmds,
            fedb,
            partial: partial || fedb_partial,
        })
    }

    fn decode_card(
        src: &mut dyn ByteSource,
        format_std: FormatStd,
        body_remaining: usize,
    ) -> Result<Self, FmrError> {
        let fmd_len = format_std.fmd_len();
        let count = if fmd_len == 0 { 0 } else { body_remaining / fmd_len };
        let (fmds, partial) = Self::decode_fmds(src, format_std, count)?;
        Ok(Fvmr {
            format_std,
            finger_number: 0,
            view_number: 0,
            impression_type: 0,
            finger_quality: 0,
            ansi07_image: None,
            fmds,
            fedb: Fedb::default(),
            partial,
        })
    }

    fn decode_fmds(
        src: &mut dyn ByteSource,
        format_std: FormatStd,
        count: usize,
    ) -> Result<(Vec<Fmd>, bool), FmrError> {
        let mut fmds = Vec::with_capacity(count);
        for _ in 0..count {
            match Fmd::decode(src, format_std) {
                Ok(fmd) => fmds.push(fmd),
                Err(FmrError::Io(IoError::EndOfData { .. })) => return Ok((fmds, true)),
                Err(e) => return Err(e),
            }
        }
        Ok((fmds, false))
    }

    pub fn encode(&self, sink: &mut dyn ByteSink) -> Result<(), FmrError> {
        match self.format_std {
            FormatStd::IsoNormalCard | FormatStd::IsoCompactCard => {
                for fmd in &self.fmds {
                    fmd.encode(sink)?;
                }
            }
            FormatStd::Ansi07 => {
                sink.write_u8(self.finger_number)?;
                sink.write_u8(self.view_number)?;
                sink.write_u8(self.impression_type)?;
                sink.write_u8(self.finger_quality)?;
                let img = self.ansi07_image.unwrap_or_default();
                sink.write_u32_be(img.algorithm_id)?;
                sink.write_u16_be(img.x_image_size)?;
                sink.write_u16_be(img.y_image_size)?;
                sink.write_u16_be(img.x_resolution)?;
                sink.write_u16_be(img.y_resolution)?;
                sink.write_u8(self.fmds.len() as u8)?;
                for fmd in &self.fmds {
                    fmd.encode(sink)?;
                }
                self.fedb.encode(sink, self.format_std)?;
            }
            FormatStd::Ansi | FormatStd::Iso => {
                sink.write_u8(self.finger_number)?;
                sink.write_u8((self.view_number << 4) | (self.impression_type & 0x0F))?;
                sink.write_u8(self.finger_quality)?;
                sink.write_u8(self.fmds.len() as u8)?;
                for fmd in &self.fmds {
                    fmd.encode(sink)?;
                }
                self.fedb.encode(sink, self.format_std)?;
            }
        }
        Ok(())
    }

    /// Per-FVMR checks from spec §4.4. View-number monotonicity is enforced
    /// by the owning [`crate::fmr::Fmr::validate`], which holds the
    /// per-finger-position state across all of its FVMRs.
    pub fn validate(
        &self,
        image_width: Option<u16>,
        image_height: Option<u16>,
    ) -> Result<(), FmrError> {
        if !format_applies_fvmr_header(self.format_std) {
            for fmd in &self.fmds {
                fmd.validate(image_width, image_height)?;
            }
            return Ok(());
        }

        if self.finger_number > 15 {
            return Err(FmrError::Invalid(format!(
                "finger_number {} not in 0..15",
                self.finger_number
            )));
        }
        if ImpressionType::try_from(self.impression_type)
            .ok()
            .map(|it| it.fmr_validator_accepts())
            != Some(true)
        {
            return Err(FmrError::Invalid(format!(
                "impression_type {} not in accepted set",
                self.impression_type
            )));
        }
        if self.finger_quality > 100 {
            return Err(FmrError::Invalid(format!(
                "finger_quality {} not in 0..100",
                self.finger_quality
            )));
        }
        for fmd in &self.fmds {
            fmd.validate(image_width, image_height)?;
        }
        self.fedb.validate(self.format_std)?;
        if let Some(core_delta) = self.fedb.feds.iter().find_map(|f| match f {
            crate::fed::Fed::CoreAndDelta(c) => Some(c),
            _ => None,
        }) {
            core_delta.validate(image_width, image_height)?;
        }
        if let Some(ridge_count) = self.fedb.feds.iter().find_map(|f| match f {
            crate::fed::Fed::RidgeCount(r) => Some(r),
            _ => None,
        }) {
            ridge_count.validate(self.number_of_minutiae())?;
        }
        Ok(())
    }
}

fn format_applies_fvmr_header(format_std: FormatStd) -> bool {
    format_std.has_fvmr_header()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fmd::MinutiaType;
    use bytes_io::{BufferSink, BufferSource};

    fn sample_fmd(x: u16, y: u16) -> Fmd {
        Fmd {
            format_std: FormatStd::Ansi,
            minutia_type: MinutiaType::RidgeEnding,
            x,
            y,
            angle: 10,
            quality: 50,
            reserved: 0,
        }
    }

    #[test]
    fn ansi_fvmr_roundtrip_no_fedb() {
        let fvmr = Fvmr {
            format_std: FormatStd::Ansi,
            finger_number: 1,
            view_number: 0,
            impression_type: 0,
            finger_quality: 50,
            ansi07_image: None,
            fmds: vec![sample_fmd(100, 120), sample_fmd(200, 240)],
            fedb: Fedb::default(),
            partial: false,
        };
        let mut sink = BufferSink::new();
        fvmr.encode(&mut sink).unwrap();
        let bytes = sink.into_inner();
        let mut src = BufferSource::new(&bytes);
        let decoded = Fvmr::decode(&mut src, FormatStd::Ansi, None).unwrap();
        assert_eq!(decoded, fvmr);
        assert_eq!(decoded.number_of_minutiae(), 2);
    }

    #[test]
    fn invalid_impression_type_rejected() {
        let fvmr = Fvmr {
            format_std: FormatStd::Ansi,
            finger_number: 1,
            view_number: 0,
            impression_type: 7, // LatentLift: not FMR-validator-accepted
            finger_quality: 50,
            ansi07_image: None,
            fmds: vec![],
            fedb: Fedb::default(),
            partial: false,
        };
        assert!(fvmr.validate(Some(500), Some(500)).is_err());
    }

    #[test]
    fn compact_card_count_derived_from_remaining_bytes() {
        let fmds = vec![
            Fmd { format_std: FormatStd::IsoCompactCard, minutia_type: MinutiaType::RidgeEnding, x: 10, y: 20, angle: 10, quality: 0, reserved: 0 },
            Fmd { format_std: FormatStd::IsoCompactCard, minutia_type: MinutiaType::Bifurcation, x: 30, y: 40, angle: 20, quality: 0, reserved: 0 },
            Fmd { format_std: FormatStd::IsoCompactCard, minutia_type: MinutiaType::Other, x: 50, y: 60, angle: 30, quality: 0, reserved: 0 },
        ];
        let mut sink = BufferSink::new();
        for fmd in &fmds {
            fmd.encode(&mut sink).unwrap();
        }
        let bytes = sink.into_inner();
        assert_eq!(bytes.len(), 9);
        let mut src = BufferSource::new(&bytes);
        let fvmr = Fvmr::decode(&mut src, FormatStd::IsoCompactCard, Some(9)).unwrap();
        assert_eq!(fvmr.number_of_minutiae(), 3);
    }
}
