use crate::report::{Report, Rule, Severity};
use crate::Options;
use fmr_core::{FormatStd, Fmr, FORMAT_ID};

fn min_header_len(format_std: FormatStd) -> usize {
    use fmr_core::{ANSI07_HDR_LEN, ANSI_HDR_SMALL_LEN, ISO_HDR_LEN};
    match format_std {
        FormatStd::Ansi => ANSI_HDR_SMALL_LEN,
        FormatStd::Iso => ISO_HDR_LEN,
        FormatStd::Ansi07 => ANSI07_HDR_LEN,
        FormatStd::IsoNormalCard | FormatStd::IsoCompactCard => 0,
    }
}

/// Header-level rules from spec §4.5. Card dialects have no header and are
/// exempt entirely.
pub fn check_header(fmr: &Fmr, options: Options, report: &mut Report) {
    if !fmr.format_std.has_record_header() {
        return;
    }

    if &fmr.format_id != FORMAT_ID {
        report.push(
            Rule::FormatMagic,
            Severity::Error,
            format!("format_id {:?} does not match magic {:?}", fmr.format_id, FORMAT_ID),
        );
    }
    if &fmr.spec_version != fmr.format_std.spec_version() {
        report.push(
            Rule::SpecVersion,
            Severity::Error,
            format!(
                "spec_version {:?} does not match expected {:?}",
                fmr.spec_version,
                fmr.format_std.spec_version()
            ),
        );
    }
    if (fmr.record_length as usize) < min_header_len(fmr.format_std) {
        report.push(
            Rule::RecordLength,
            Severity::Error,
            format!(
                "record_length {} below minimum header length {}",
                fmr.record_length,
                min_header_len(fmr.format_std)
            ),
        );
    }
    if fmr.reserved != 0 {
        report.push(Rule::ReservedByte, Severity::Error, "header reserved byte non-zero");
    }
    if matches!(fmr.format_std, FormatStd::Ansi) && !options.minex_profile {
        if fmr.cbeff.map(|c| c.owner).unwrap_or(0) == 0 {
            report.push(Rule::CbeffOwner, Severity::Error, "CBEFF owner must be non-zero");
        }
    }
    if matches!(fmr.format_std, FormatStd::Ansi | FormatStd::Iso) {
        let img = fmr.image.unwrap_or_default();
        if img.x_resolution == 0 || img.y_resolution == 0 {
            report.push(
                Rule::Resolution,
                Severity::Error,
                "x_resolution/y_resolution must be > 0",
            );
        }
    }
}

/// Per-FVMR structural rules plus the cross-FVMR view-number monotonicity
/// rule from spec §4.4, kept separate so a monotonicity gap doesn't mask an
/// unrelated structural failure on the same FVMR or vice versa.
pub fn check_views(fmr: &Fmr, _options: Options, report: &mut Report) {
    let (image_width, image_height) = fmr
        .image
        .map(|i| (Some(i.x_image_size), Some(i.y_image_size)))
        .unwrap_or((None, None));

    let mut next_min_view = [0u8; 16];
    for fvmr in &fmr.fvmrs {
        if let Err(e) = fvmr.validate(image_width, image_height) {
            report.push(Rule::FvmrStructural, Severity::Error, e.to_string());
        }

        if !fmr.format_std.has_fvmr_header() {
            continue;
        }
        let pos = fvmr.finger_number as usize;
        if pos >= next_min_view.len() {
            continue;
        }
        if fvmr.view_number < next_min_view[pos] {
            report.push(
                Rule::ViewMonotonic,
                Severity::Error,
                format!(
                    "finger {} view {} is below minimum expected view {}",
                    pos, fvmr.view_number, next_min_view[pos]
                ),
            );
        } else {
            next_min_view[pos] = fvmr.view_number + 1;
        }
    }
}
