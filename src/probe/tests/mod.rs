//! Probe tests and synthetic PE fixtures
//!
//! The fixtures build just enough of a PE image (headers that pass `pelite`'s
//! validation and one `.rsrc` section with a type/name/language resource tree) to
//! exercise the version lookup end to end.

use super::*;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════
// FIXTURE BUILDERS
// ═══════════════════════════════════════════════════════════════════════════

const RT_VERSION: u32 = 16;

#[derive(Debug, Clone, Copy)]
pub(crate) enum PeLayout {
    Pe32,
    Pe32Plus,
}

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn pad4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

fn put_u16(out: &mut [u8], at: usize, v: u16) {
    out[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(out: &mut [u8], at: usize, v: u32) {
    out[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn utf16z(s: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for unit in s.encode_utf16() {
        push_u16(&mut out, unit);
    }
    push_u16(&mut out, 0);
    out
}

/// One version-info node; children must already be serialized
fn node(key: &str, text: bool, value: &[u8], value_len: u16, children: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![0u8; 6];
    out.extend_from_slice(&utf16z(key));
    pad4(&mut out);
    out.extend_from_slice(value);
    pad4(&mut out);
    for child in children {
        out.extend_from_slice(child);
        pad4(&mut out);
    }
    let total = out.len() as u16;
    put_u16(&mut out, 0, total);
    put_u16(&mut out, 2, value_len);
    put_u16(&mut out, 4, u16::from(text));
    out
}

fn string_node(name: &str, value: &str) -> Vec<u8> {
    let encoded = utf16z(value);
    node(name, true, &encoded, (encoded.len() / 2) as u16, &[])
}

fn fixed_file_info() -> Vec<u8> {
    let mut out = Vec::new();
    push_u32(&mut out, 0xFEEF_04BD);
    push_u32(&mut out, 0x0001_0000);
    // file version 8.7.6.0, product version 8.7.6.0
    for _ in 0..2 {
        push_u32(&mut out, (8 << 16) | 7);
        push_u32(&mut out, 6 << 16);
    }
    out.resize(52, 0);
    out
}

/// Version block with explicit translation pairs and string tables keyed independently
pub(crate) fn build_version_block_raw(
    translations: &[(u16, u16)],
    tables: &[(&str, &[(&str, &str)])],
) -> Vec<u8> {
    let mut children = Vec::new();

    if !tables.is_empty() {
        let tables: Vec<Vec<u8>> = tables
            .iter()
            .map(|(key, strings)| {
                let strings: Vec<Vec<u8>> = strings
                    .iter()
                    .map(|(name, value)| string_node(name, value))
                    .collect();
                node(key, true, &[], 0, &strings)
            })
            .collect();
        children.push(node("StringFileInfo", true, &[], 0, &tables));
    }

    if !translations.is_empty() {
        let mut pairs = Vec::new();
        for (lang, codepage) in translations {
            push_u16(&mut pairs, *lang);
            push_u16(&mut pairs, *codepage);
        }
        let var = node("Translation", false, &pairs, pairs.len() as u16, &[]);
        children.push(node("VarFileInfo", true, &[], 0, &[var]));
    }

    let fixed = fixed_file_info();
    node("VS_VERSION_INFO", false, &fixed, fixed.len() as u16, &children)
}

/// Version block whose translation table lists exactly the given string tables
pub(crate) fn build_version_block(locales: &[(u16, u16, &[(&str, &str)])]) -> Vec<u8> {
    let keys: Vec<String> = locales
        .iter()
        .map(|(lang, cp, _)| format!("{lang:04x}{cp:04x}"))
        .collect();
    let tables: Vec<(&str, &[(&str, &str)])> = locales
        .iter()
        .zip(&keys)
        .map(|((_, _, strings), key)| (key.as_str(), *strings))
        .collect();
    let translations: Vec<(u16, u16)> = locales.iter().map(|(l, c, _)| (*l, *c)).collect();
    build_version_block_raw(&translations, &tables)
}

/// Minimal PE image with one `.rsrc` section carrying `version_block` as `RT_VERSION`
pub(crate) fn build_pe(layout: PeLayout, version_block: Option<&[u8]>) -> Vec<u8> {
    const NT_OFFSET: usize = 0x80;
    const RSRC_RVA: u32 = 0x1000;
    const RSRC_FILE_OFFSET: usize = 0x200;
    const BLOCK_OFFSET: usize = 0x60;

    let (magic, machine, optional_len, dirs_offset) = match layout {
        PeLayout::Pe32 => (0x10bu16, 0x14cu16, 224usize, 96usize),
        PeLayout::Pe32Plus => (0x20b, 0x8664, 240, 112),
    };

    // resource section: type dir -> name dir -> language dir -> data entry -> block
    let mut rsrc = Vec::new();
    let block = version_block.unwrap_or(&[]);
    // type directory with an RT_ICON entry ahead of RT_VERSION
    rsrc.extend_from_slice(&[0; 12]);
    push_u16(&mut rsrc, 0);
    push_u16(&mut rsrc, 2);
    push_u32(&mut rsrc, 3);
    push_u32(&mut rsrc, 0x8000_0000 | 0x20);
    push_u32(&mut rsrc, RT_VERSION);
    push_u32(&mut rsrc, 0x8000_0000 | 0x20);
    // name directory at 0x20
    rsrc.extend_from_slice(&[0; 12]);
    push_u16(&mut rsrc, 0);
    push_u16(&mut rsrc, 1);
    push_u32(&mut rsrc, 1);
    push_u32(&mut rsrc, 0x8000_0000 | 0x38);
    // language directory at 0x38
    rsrc.extend_from_slice(&[0; 12]);
    push_u16(&mut rsrc, 0);
    push_u16(&mut rsrc, 1);
    push_u32(&mut rsrc, 0x0409);
    push_u32(&mut rsrc, 0x50);
    // data entry at 0x50
    push_u32(&mut rsrc, RSRC_RVA + BLOCK_OFFSET as u32);
    push_u32(&mut rsrc, block.len() as u32);
    push_u32(&mut rsrc, 0);
    push_u32(&mut rsrc, 0);
    assert_eq!(rsrc.len(), BLOCK_OFFSET);
    rsrc.extend_from_slice(block);
    let rsrc_len = rsrc.len();
    rsrc.resize(rsrc_len.div_ceil(0x200) * 0x200, 0);

    let mut image = vec![0u8; RSRC_FILE_OFFSET];
    image[0..2].copy_from_slice(b"MZ");
    put_u32(&mut image, 0x3c, NT_OFFSET as u32);
    image[NT_OFFSET..NT_OFFSET + 4].copy_from_slice(b"PE\0\0");

    let coff = NT_OFFSET + 4;
    put_u16(&mut image, coff, machine);
    put_u16(&mut image, coff + 2, 1);
    put_u16(&mut image, coff + 16, optional_len as u16);
    // executable image
    put_u16(&mut image, coff + 18, 0x0102);

    let optional = coff + 20;
    put_u16(&mut image, optional, magic);
    put_u32(&mut image, optional + 32, RSRC_RVA);
    put_u32(&mut image, optional + 36, RSRC_FILE_OFFSET as u32);
    put_u32(&mut image, optional + 56, RSRC_RVA + rsrc.len().div_ceil(0x1000) as u32 * 0x1000);
    put_u32(&mut image, optional + 60, RSRC_FILE_OFFSET as u32);
    put_u32(&mut image, optional + dirs_offset - 4, 16);
    if version_block.is_some() {
        let dir = optional + dirs_offset + 2 * 8;
        put_u32(&mut image, dir, RSRC_RVA);
        put_u32(&mut image, dir + 4, rsrc_len as u32);
    }

    let section = optional + optional_len;
    image[section..section + 8].copy_from_slice(b".rsrc\0\0\0");
    put_u32(&mut image, section + 8, rsrc_len as u32);
    put_u32(&mut image, section + 12, RSRC_RVA);
    put_u32(&mut image, section + 16, rsrc.len() as u32);
    put_u32(&mut image, section + 20, RSRC_FILE_OFFSET as u32);
    put_u32(&mut image, section + 36, 0x4000_0040);

    image.extend_from_slice(&rsrc);
    image
}

/// PE image whose ProductVersion is `version`
pub(crate) fn pe_with_product_version(version: &str) -> Vec<u8> {
    let block = build_version_block(&[(0x0409, 0x04b0, &[("ProductVersion", version)])]);
    build_pe(PeLayout::Pe32Plus, Some(&block))
}

// ═══════════════════════════════════════════════════════════════════════════
// ARCHITECTURE HEURISTIC TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_arch_from_x86_program_files() {
    let path = PathBuf::from(r"C:\Program Files (x86)\Notepad++\notepad++.exe");
    assert_eq!(detect_arch_from_install_path(Some(&path)), Architecture::X86);
}

#[test]
fn test_arch_defaults_to_x64() {
    let path = PathBuf::from(r"C:\Program Files\Notepad++\notepad++.exe");
    assert_eq!(detect_arch_from_install_path(Some(&path)), Architecture::X64);
    assert_eq!(detect_arch_from_install_path(None), Architecture::X64);
    assert_eq!(
        detect_arch_from_install_path(Some(Path::new("/opt/npp/notepad++.exe"))),
        Architecture::X64
    );
}

#[test]
fn test_architecture_tokens() {
    assert_eq!(Architecture::X86.to_string(), "x86");
    assert_eq!(Architecture::X64.as_str(), "x64");
    assert_eq!(serde_json::to_string(&Architecture::X86).unwrap(), "\"x86\"");
}

// ═══════════════════════════════════════════════════════════════════════════
// EMBEDDED VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_product_version_extracted() {
    let image = pe_with_product_version("8.7.6");
    assert_eq!(version_from_image(&image), Ok("8.7.6".to_string()));
}

#[test]
fn test_product_version_trimmed_to_numeric_run() {
    let image = pe_with_product_version("8.7.6 (64-bit)");
    assert_eq!(version_from_image(&image), Ok("8.7.6".to_string()));
}

#[test]
fn test_non_numeric_version_returned_raw() {
    let image = pe_with_product_version("nightly");
    assert_eq!(version_from_image(&image), Ok("nightly".to_string()));
}

#[test]
fn test_file_version_fallback() {
    let block = build_version_block(&[(0x0409, 0x04b0, &[("FileVersion", "8.7.5")])]);
    let image = build_pe(PeLayout::Pe32, Some(&block));
    assert_eq!(version_from_image(&image), Ok("8.7.5".to_string()));
}

#[test]
fn test_empty_product_version_falls_back() {
    let block = build_version_block(&[(
        0x0409,
        0x04b0,
        &[("ProductVersion", ""), ("FileVersion", "8.7.4")],
    )]);
    let image = build_pe(PeLayout::Pe32Plus, Some(&block));
    assert_eq!(version_from_image(&image), Ok("8.7.4".to_string()));
}

#[test]
fn test_only_first_translation_consulted() {
    // Strings live under the second locale only; the probe never looks there
    let block = build_version_block_raw(
        &[(0x0409, 0x04b0), (0x0407, 0x04e4)],
        &[("040704e4", &[("ProductVersion", "8.7.6")])],
    );
    let image = build_pe(PeLayout::Pe32Plus, Some(&block));
    assert_eq!(
        version_from_image(&image),
        Err(ProbeFailure::NoVersionString)
    );
}

#[test]
fn test_translations_listed_in_order() {
    let block = build_version_block(&[
        (0x0409, 0x04b0, &[("ProductVersion", "8.7.6")]),
        (0x0407, 0x04e4, &[("ProductVersion", "8.7.5")]),
    ]);
    let image = build_pe(PeLayout::Pe32, Some(&block));
    let info = version_info(&image).unwrap();
    assert_eq!(info.translation().len(), 2);
    assert_eq!(version_from_image(&image), Ok("8.7.6".to_string()));
}

#[test]
fn test_missing_translation_table() {
    let block = build_version_block_raw(&[], &[("040904b0", &[("ProductVersion", "8.7.6")])]);
    let image = build_pe(PeLayout::Pe32Plus, Some(&block));
    assert_eq!(version_from_image(&image), Err(ProbeFailure::NoTranslation));
}

#[test]
fn test_missing_version_resource() {
    let image = build_pe(PeLayout::Pe32Plus, None);
    assert_eq!(
        version_from_image(&image),
        Err(ProbeFailure::NoVersionResource)
    );
}

#[test]
fn test_not_a_pe_image() {
    assert!(matches!(
        version_from_image(b"plain text"),
        Err(ProbeFailure::NotPeImage(_))
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// FILESYSTEM PROBE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_find_first_existing_candidate() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("Program Files").join("notepad++.exe");
    let second = dir.path().join("Program Files (x86)").join("notepad++.exe");
    fs::create_dir_all(second.parent().unwrap()).unwrap();
    fs::write(&second, b"x").unwrap();

    let candidates = vec![first.clone(), second.clone()];
    assert_eq!(find_installed_executable(&candidates), Some(second.clone()));

    fs::create_dir_all(first.parent().unwrap()).unwrap();
    fs::write(&first, b"x").unwrap();
    assert_eq!(find_installed_executable(&candidates), Some(first));
}

#[test]
fn test_find_none_when_absent() {
    let dir = TempDir::new().unwrap();
    let candidates = vec![dir.path().join("a.exe"), dir.path().join("b.exe")];
    assert_eq!(find_installed_executable(&candidates), None);
    assert_eq!(find_installed_executable(&[]), None);
}

#[test]
fn test_probe_not_installed() {
    let dir = TempDir::new().unwrap();
    let probe = probe_installed(&[dir.path().join("missing.exe")]);
    assert_eq!(probe, VersionProbe::NotInstalled);
    assert_eq!(probe.exe_path(), None);
    assert_eq!(probe.version(), None);
}

#[test]
fn test_probe_installed_but_unreadable() {
    let dir = TempDir::new().unwrap();
    let exe = dir.path().join("notepad++.exe");
    fs::write(&exe, b"stripped").unwrap();

    let probe = probe_installed(&[exe.clone()]);
    assert!(matches!(
        &probe,
        VersionProbe::Unreadable { reason: ProbeFailure::NotPeImage(_), .. }
    ));
    assert_eq!(probe.exe_path(), Some(exe.as_path()));
    assert_eq!(probe.version(), None);
}

#[test]
fn test_probe_installed_with_version() {
    let dir = TempDir::new().unwrap();
    let exe = dir.path().join("notepad++.exe");
    fs::write(&exe, pe_with_product_version("8.7.6")).unwrap();

    let probe = probe_installed(&[exe.clone()]);
    assert_eq!(
        probe,
        VersionProbe::Installed {
            exe_path: exe,
            version: "8.7.6".to_string()
        }
    );
    assert_eq!(probe.version(), Some("8.7.6"));
}

#[test]
fn test_read_embedded_version_unreadable_path() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        read_embedded_version(&dir.path().join("nope.exe")),
        Err(ProbeFailure::Unreadable(_))
    ));
}
