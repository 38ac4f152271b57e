//! 29109-2 conformance validation, layered on top of `fmr-core`'s structural
//! decode/encode.
//!
//! `fmr-core::Fmr::validate` already walks the record tree and returns the
//! conjunction of every structural rule as a first-failure `Result`. This
//! crate adds the policy layer spec'd separately from the codec: named
//! rules grouped the way the 29109-2 profile groups them (header, per-FVMR,
//! per-finger monotonicity), a profile switch (MINEX relaxes the CBEFF-owner
//! rule), and a report that keeps going past the first failure so a caller
//! sees every violation in one pass instead of one-at-a-time.

mod report;
mod rules;

pub use report::{Finding, Report, Rule, Severity};

use fmr_core::Fmr;
use log::debug;

/// Validator configuration. `minex_profile` mirrors the build-time MINEX
/// switch named in spec §4.5: it disables the CBEFF-owner-nonzero rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub minex_profile: bool,
}

/// Run every 29109-2 rule against `fmr` and return the full set of findings.
///
/// Unlike `Fmr::validate`, this never stops at the first violation: it is
/// meant for an operator report, not a hot-path accept/reject decision.
pub fn validate(fmr: &Fmr, options: Options) -> Report {
    debug!("running conformance rule tree for {:?}", fmr.format_std);
    let mut report = Report::default();
    rules::check_header(fmr, options, &mut report);
    rules::check_views(fmr, options, &mut report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmr_core::{Fed, Fedb, Fmd, FormatStd, Fvmr, MinutiaType};

    fn base_fmr() -> Fmr {
        Fmr {
            format_std: FormatStd::Ansi,
            format_id: *b"FMR\0",
            spec_version: *b" 20\0",
            record_length: 0x32,
            cbeff: Some(fmr_core::Cbeff { owner: 0x001B, product_type: 0x0201 }),
            compliance: 0,
            scanner_id: 0,
            image: Some(fmr_core::ImageMetadata {
                x_image_size: 500,
                y_image_size: 500,
                x_resolution: 197,
                y_resolution: 197,
            }),
            num_views: 1,
            reserved: 0,
            fvmrs: vec![Fvmr {
                format_std: FormatStd::Ansi,
                finger_number: 1,
                view_number: 0,
                impression_type: 0,
                finger_quality: 50,
                ansi07_image: None,
                fmds: vec![Fmd {
                    format_std: FormatStd::Ansi,
                    minutia_type: MinutiaType::RidgeEnding,
                    x: 100,
                    y: 120,
                    angle: 10,
                    quality: 80,
                    reserved: 0,
                }],
                fedb: Fedb::default(),
                partial: false,
            }],
            truncated: false,
        }
    }

    #[test]
    fn conformant_record_has_no_findings() {
        let report = validate(&base_fmr(), Options::default());
        assert!(report.is_conformant());
        assert!(report.findings.is_empty());
    }

    #[test]
    fn zero_cbeff_owner_flagged_unless_minex() {
        let mut fmr = base_fmr();
        fmr.cbeff = Some(fmr_core::Cbeff { owner: 0, product_type: 0 });

        let strict = validate(&fmr, Options { minex_profile: false });
        assert!(!strict.is_conformant());
        assert!(strict.findings.iter().any(|f| f.rule == Rule::CbeffOwner));

        let minex = validate(&fmr, Options { minex_profile: true });
        assert!(minex.is_conformant());
    }

    #[test]
    fn gap_in_view_numbers_is_reported_once_per_finger() {
        let mut fmr = base_fmr();
        fmr.num_views = 2;
        // second view repeats view_number 0 on the same finger: violates
        // "next view must be >= previous + 1".
        let second = fmr.fvmrs[0].clone();
        fmr.fvmrs.push(second);

        let report = validate(&fmr, Options::default());
        assert_eq!(
            report.findings.iter().filter(|f| f.rule == Rule::ViewMonotonic).count(),
            1
        );
    }

    #[test]
    fn unknown_extended_datum_does_not_block_report() {
        let mut fmr = base_fmr();
        fmr.fvmrs[0].fedb = Fedb {
            feds: vec![Fed::Other { type_id: 9001, payload: vec![1, 2, 3] }],
            partial: false,
            ..Default::default()
        };
        let report = validate(&fmr, Options::default());
        assert!(report.is_conformant());
    }
}
