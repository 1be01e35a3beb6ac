//! Output file naming.

/// Extension stripped from the input basename.
pub const INPUT_EXT: &str = ".con";

/// Suffix marking a raw, tSSS-filtered FIF file.
pub const OUTPUT_SUFFIX: &str = "_raw_tsss.fif";

/// Derive the output file name from the `.con` path.
///
/// The basename (text after the last `/`) loses every `.con`, then every
/// remaining `.` and space becomes `_`, then [`OUTPUT_SUFFIX`] is appended.
///
/// ```
/// use con2fif::naming::output_filename;
/// assert_eq!(
///     output_filename("/data/subj01 session.1.con"),
///     "subj01_session_1_raw_tsss.fif",
/// );
/// ```
pub fn output_filename(con_path: &str) -> String {
    let base = con_path.rsplit('/').next().unwrap_or(con_path);
    let mut name = base.replace(INPUT_EXT, "").replace(['.', ' '], "_");
    name.push_str(OUTPUT_SUFFIX);
    name
}
