// src/rop.rs

//! Ternary raster operations.
//!
//! The legacy drawing orders carry an 8-bit raster-operation code selecting
//! one of 256 boolean combinations of Pattern (P), Source (S), and
//! Destination (D) bits. [`ROP3_CODE_TABLE`] holds the full 32-bit
//! descriptors (operation index in the high word, the encoded boolean
//! program in the low word) as process-wide constant data; evaluation uses
//! the high-word truth table directly, expanding its eight minterms per
//! color channel so that channel widths never interact.
//!
//! Line orders use the related two-operand ROP2 codes over (pen, dest).

/// Copy-source operation, `out = S`.
pub const ROP3_SRCCOPY: u8 = 0xcc;
/// Pattern copy, `out = P`.
pub const ROP3_PATCOPY: u8 = 0xf0;
/// Clear all destination bits, `out = 0`.
pub const ROP3_BLACKNESS: u8 = 0x00;
/// Set all destination bits, `out = 1`.
pub const ROP3_WHITENESS: u8 = 0xff;
/// Invert the destination, `out = !D`.
pub const ROP3_DSTINVERT: u8 = 0x55;
/// Source AND destination, `out = S & D`.
pub const ROP3_SRCAND: u8 = 0x88;

/// ROP2 pen copy, `out = P`.
pub const ROP2_COPYPEN: u8 = 0x0d;
/// ROP2 exclusive-or, `out = P ^ D`.
pub const ROP2_XORPEN: u8 = 0x07;

/// The 256 ternary raster-operation descriptors, indexed by the order's
/// raster-op byte. Comments give the reverse-polish mnemonic over P/S/D
/// with a=AND, o=OR, x=XOR, n=NOT.
pub const ROP3_CODE_TABLE: [u32; 256] = [
    0x00000042, // 0
    0x00010289, // DPSoon
    0x00020c89, // DPSona
    0x000300aa, // PSon
    0x00040c88, // SDPona
    0x000500a9, // DPon
    0x00060865, // PDSxnon
    0x000702c5, // PDSaon
    0x00080f08, // SDPnaa
    0x00090245, // PDSxon
    0x000a0329, // DPna
    0x000b0b2a, // PSDnaon
    0x000c0324, // SPna
    0x000d0b25, // PDSnaon
    0x000e08a5, // PDSonon
    0x000f0001, // Pn
    0x00100c85, // PDSona
    0x001100a6, // DSon
    0x00120868, // SDPxnon
    0x001302c8, // SDPaon
    0x00140869, // DPSxnon
    0x001502c9, // DPSaon
    0x00165cca, // PSDPSanaxx
    0x00171d54, // SSPxDSxaxn
    0x00180d59, // SPxPDxa
    0x00191cc8, // SDPSanaxn
    0x001a06c5, // PDSPaox
    0x001b0768, // SDPSxaxn
    0x001c06ca, // PSDPaox
    0x001d0766, // DSPDxaxn
    0x001e01a5, // PDSox
    0x001f0385, // PDSoan
    0x00200f09, // DPSnaa
    0x00210248, // SDPxon
    0x00220326, // DSna
    0x00230b24, // SPDnaon
    0x00240d55, // SPxDSxa
    0x00251cc5, // PDSPanaxn
    0x002606c8, // SDPSaox
    0x00271868, // SDPSxnox
    0x00280369, // DPSxa
    0x002916ca, // PSDPSaoxxn
    0x002a0cc9, // DPSana
    0x002b1d58, // SSPxPDxaxn
    0x002c0784, // SPDSoax
    0x002d060a, // PSDnox
    0x002e064a, // PSDPxox
    0x002f0e2a, // PSDnoan
    0x0030032a, // PSna
    0x00310b28, // SDPnaon
    0x00320688, // SDPSoox
    0x00330008, // Sn
    0x003406c4, // SPDSaox
    0x00351864, // SPDSxnox
    0x003601a8, // SDPox
    0x00370388, // SDPoan
    0x0038078a, // PSDPoax
    0x00390604, // SPDnox
    0x003a0644, // SPDSxox
    0x003b0e24, // SPDnoan
    0x003c004a, // PSx
    0x003d18a4, // SPDSonox
    0x003e1b24, // SPDSnaox
    0x003f00ea, // PSan
    0x00400f0a, // PSDnaa
    0x00410249, // DPSxon
    0x00420d5d, // SDxPDxa
    0x00431cc4, // SPDSanaxn
    0x00440328, // SDna
    0x00450b29, // DPSnaon
    0x004606c6, // DSPDaox
    0x0047076a, // PSDPxaxn
    0x00480368, // SDPxa
    0x004916c5, // PDSPDaoxxn
    0x004a0789, // DPSDoax
    0x004b0605, // PDSnox
    0x004c0cc8, // SDPana
    0x004d1954, // SSPxDSxoxn
    0x004e0645, // PDSPxox
    0x004f0e25, // PDSnoan
    0x00500325, // PDna
    0x00510b26, // DSPnaon
    0x005206c9, // DPSDaox
    0x00530764, // SPDSxaxn
    0x005408a9, // DPSonon
    0x00550009, // Dn
    0x005601a9, // DPSox
    0x00570389, // DPSoan
    0x00580785, // PDSPoax
    0x00590609, // DPSnox
    0x005a0049, // DPx
    0x005b18a9, // DPSDonox
    0x005c0649, // DPSDxox
    0x005d0e29, // DPSnoan
    0x005e1b29, // DPSDnaox
    0x005f00e9, // DPan
    0x00600365, // PDSxa
    0x006116c6, // DSPDSaoxxn
    0x00620786, // DSPDoax
    0x00630608, // SDPnox
    0x00640788, // SDPSoax
    0x00650606, // DSPnox
    0x00660046, // DSx
    0x006718a8, // SDPSonox
    0x006858a6, // DSPDSonoxxn
    0x00690145, // PDSxxn
    0x006a01e9, // DPSax
    0x006b178a, // PSDPSoaxxn
    0x006c01e8, // SDPax
    0x006d1785, // PDSPDoaxxn
    0x006e1e28, // SDPSnoax
    0x006f0c65, // PDSxnan
    0x00700cc5, // PDSana
    0x00711d5c, // SSDxPDxaxn
    0x00720648, // SDPSxox
    0x00730e28, // SDPnoan
    0x00740646, // DSPDxox
    0x00750e26, // DSPnoan
    0x00761b28, // SDPSnaox
    0x007700e6, // DSan
    0x007801e5, // PDSax
    0x00791786, // DSPDSoaxxn
    0x007a1e29, // DPSDnoax
    0x007b0c68, // SDPxnan
    0x007c1e24, // SPDSnoax
    0x007d0c69, // DPSxnan
    0x007e0955, // SPxDSxo
    0x007f03c9, // DPSaan
    0x008003e9, // DPSaa
    0x00810975, // SPxDSxon
    0x00820c49, // DPSxna
    0x00831e04, // SPDSnoaxn
    0x00840c48, // SDPxna
    0x00851e05, // PDSPnoaxn
    0x008617a6, // DSPDSoaxx
    0x008701c5, // PDSaxn
    0x008800c6, // DSa
    0x00891b08, // SDPSnaoxn
    0x008a0e06, // DSPnoa
    0x008b0666, // DSPDxoxn
    0x008c0e08, // SDPnoa
    0x008d0668, // SDPSxoxn
    0x008e1d7c, // SSDxPDxax
    0x008f0ce5, // PDSanan
    0x00900c45, // PDSxna
    0x00911e08, // SDPSnoaxn
    0x009217a9, // DPSDPoaxx
    0x009301c4, // SPDaxn
    0x009417aa, // PSDPSoaxx
    0x009501c9, // DPSaxn
    0x00960169, // DPSxx
    0x0097588a, // PSDPSonoxx
    0x00981888, // SDPSonoxn
    0x00990066, // DSxn
    0x009a0709, // DPSnax
    0x009b07a8, // SDPSoaxn
    0x009c0704, // SPDnax
    0x009d07a6, // DSPDoaxn
    0x009e16e6, // DSPDSaoxx
    0x009f0345, // PDSxan
    0x00a000c9, // DPa
    0x00a11b05, // PDSPnaoxn
    0x00a20e09, // DPSnoa
    0x00a30669, // DPSDxoxn
    0x00a41885, // PDSPonoxn
    0x00a50065, // PDxn
    0x00a60706, // DSPnax
    0x00a707a5, // PDSPoaxn
    0x00a803a9, // DPSoa
    0x00a90189, // DPSoxn
    0x00aa0029, // D
    0x00ab0889, // DPSono
    0x00ac0744, // SPDSxax
    0x00ad06e9, // DPSDaoxn
    0x00ae0b06, // DSPnao
    0x00af0229, // DPno
    0x00b00e05, // PDSnoa
    0x00b10665, // PDSPxoxn
    0x00b21974, // SSPxDSxox
    0x00b30ce8, // SDPanan
    0x00b4070a, // PSDnax
    0x00b507a9, // DPSDoaxn
    0x00b616e9, // DPSDPaoxx
    0x00b70348, // SDPxan
    0x00b8074a, // PSDPxax
    0x00b906e6, // DSPDaoxn
    0x00ba0b09, // DPSnao
    0x00bb0226, // DSno
    0x00bc1ce4, // SPDSanax
    0x00bd0d7d, // SDxPDxan
    0x00be0269, // DPSxo
    0x00bf08c9, // DPSano
    0x00c000ca, // PSa
    0x00c11b04, // SPDSnaoxn
    0x00c21884, // SPDSonoxn
    0x00c3006a, // PSxn
    0x00c40e04, // SPDnoa
    0x00c50664, // SPDSxoxn
    0x00c60708, // SDPnax
    0x00c707aa, // PSDPoaxn
    0x00c803a8, // SDPoa
    0x00c90184, // SPDoxn
    0x00ca0749, // DPSDxax
    0x00cb06e4, // SPDSaoxn
    0x00cc0020, // S
    0x00cd0888, // SDPono
    0x00ce0b08, // SDPnao
    0x00cf0224, // SPno
    0x00d00e0a, // PSDnoa
    0x00d1066a, // PSDPxoxn
    0x00d20705, // PDSnax
    0x00d307a4, // SPDSoaxn
    0x00d41d78, // SSPxPDxax
    0x00d50ce9, // DPSanan
    0x00d616ea, // PSDPSaoxx
    0x00d70349, // DPSxan
    0x00d80745, // PDSPxax
    0x00d906e8, // SDPSaoxn
    0x00da1ce9, // DPSDanax
    0x00db0d75, // SPxDSxan
    0x00dc0b04, // SPDnao
    0x00dd0228, // SDno
    0x00de0268, // SDPxo
    0x00df08c8, // SDPano
    0x00e003a5, // PDSoa
    0x00e10185, // PDSoxn
    0x00e20746, // DSPDxax
    0x00e306ea, // PSDPaoxn
    0x00e40748, // SDPSxax
    0x00e506e5, // PDSPaoxn
    0x00e61ce8, // SDPSanax
    0x00e70d79, // SPxPDxan
    0x00e81d74, // SSPxDSxax
    0x00e95ce6, // DSPDSanaxxn
    0x00ea02e9, // DPSao
    0x00eb0849, // DPSxno
    0x00ec02e8, // SDPao
    0x00ed0848, // SDPxno
    0x00ee0086, // DSo
    0x00ef0a08, // SDPnoo
    0x00f00021, // P
    0x00f10885, // PDSono
    0x00f20b05, // PDSnao
    0x00f3022a, // PSno
    0x00f40b0a, // PSDnao
    0x00f50225, // PDno
    0x00f60265, // PDSxo
    0x00f708c5, // PDSano
    0x00f802e5, // PDSao
    0x00f90845, // PDSxno
    0x00fa0089, // DPo
    0x00fb0a09, // DPSnoo
    0x00fc008a, // PSo
    0x00fd0a0a, // PSDnoo
    0x00fe02a9, // DPSoo
    0x00ff0062, // 1
];

/// Returns the 32-bit descriptor for a raster-op byte.
pub const fn rop3_code(code: u8) -> u32 {
    ROP3_CODE_TABLE[code as usize]
}

/// Evaluates one 8-bit channel of a ternary raster operation.
///
/// `truth` is the operation's truth table: bit `(P << 2) | (S << 1) | D`
/// gives the output bit for that input combination. Expanding the set
/// minterms as bitwise expressions applies the table to all eight channel
/// bits at once.
fn rop3_channel(truth: u8, p: u8, s: u8, d: u8) -> u8 {
    let mut out = 0u8;
    for minterm in 0..8u8 {
        if truth & (1 << minterm) != 0 {
            let pp = if minterm & 0b100 != 0 { p } else { !p };
            let ss = if minterm & 0b010 != 0 { s } else { !s };
            let dd = if minterm & 0b001 != 0 { d } else { !d };
            out |= pp & ss & dd;
        }
    }
    out
}

/// Applies a ternary raster operation to one canonical pixel triple.
///
/// Evaluated per color channel rather than as a packed integer so the same
/// routine stays correct for any channel layout of the canonical word.
pub fn rop3(code: u8, pattern: u32, source: u32, dest: u32) -> u32 {
    let truth = (rop3_code(code) >> 16) as u8;
    let p = pattern.to_le_bytes();
    let s = source.to_le_bytes();
    let d = dest.to_le_bytes();
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = rop3_channel(truth, p[i], s[i], d[i]);
    }
    u32::from_le_bytes(out)
}

/// Applies a binary (pen, dest) raster operation for line orders.
///
/// ROP2 codes are 1..=16; `code - 1` is the truth table over the minterm
/// index `(P << 1) | D`. Out-of-range codes behave as pen copy.
pub fn rop2(code: u8, pen: u32, dest: u32) -> u32 {
    let truth = match code {
        1..=16 => code - 1,
        _ => ROP2_COPYPEN - 1,
    };
    let p = pen.to_le_bytes();
    let d = dest.to_le_bytes();
    let mut out = [0u8; 4];
    for i in 0..4 {
        let mut channel = 0u8;
        for minterm in 0..4u8 {
            if truth & (1 << minterm) != 0 {
                let pp = if minterm & 0b10 != 0 { p[i] } else { !p[i] };
                let dd = if minterm & 0b01 != 0 { d[i] } else { !d[i] };
                channel |= pp & dd;
            }
        }
        out[i] = channel;
    }
    u32::from_le_bytes(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_all_codes() {
        // Contract: every raster-op byte has a defined descriptor whose
        // high word is the operation index itself.
        assert_eq!(ROP3_CODE_TABLE.len(), 256);
        for code in 0..=255u8 {
            assert_eq!(rop3_code(code) >> 16, code as u32, "code {code:#04x}");
        }
    }

    #[test]
    fn test_srccopy_reproduces_source() {
        // Contract: the identity code is byte-for-byte source reproduction.
        for &src in &[0u32, 0x00ff_ffff, 0x0012_3456, 0x00aa_5500] {
            assert_eq!(rop3(ROP3_SRCCOPY, 0xdead_beef, src, 0x0055_aa55), src);
        }
    }

    #[test]
    fn test_blackness_and_whiteness() {
        assert_eq!(rop3(ROP3_BLACKNESS, 0x11, 0x22, 0x33), 0);
        assert_eq!(rop3(ROP3_WHITENESS, 0x11, 0x22, 0x33), 0xffff_ffff);
    }

    #[test]
    fn test_dstinvert() {
        assert_eq!(rop3(ROP3_DSTINVERT, 0, 0, 0x00f0_0f3c), !0x00f0_0f3c);
    }

    #[test]
    fn test_patcopy_and_patinvert() {
        assert_eq!(rop3(ROP3_PATCOPY, 0x0012_3456, 0, 0xffff_ffff), 0x0012_3456);
        // 0x5A is P ^ D.
        assert_eq!(rop3(0x5a, 0x00ff_00ff, 0, 0x0f0f_0f0f), 0x00ff_00ff ^ 0x0f0f_0f0f);
    }

    #[test]
    fn test_srcand_truth_table() {
        // Hand-computed boolean algebra on a synthetic 2x2 bitmap.
        let src = [0x00u32, 0xff, 0x0f, 0xf0];
        let dst = [0xffu32, 0xff, 0x33, 0x55];
        for i in 0..4 {
            assert_eq!(rop3(ROP3_SRCAND, 0, src[i], dst[i]), src[i] & dst[i]);
        }
    }

    #[test]
    fn test_merge_paint_rop() {
        // 0xBB is "DSno": D | !S, checked against direct evaluation.
        let s = 0x00c3_a512u32;
        let d = 0x0081_42ffu32;
        assert_eq!(rop3(0xbb, 0, s, d), (d | !s) & 0xffff_ffff);
    }

    #[test]
    fn test_rop2_copy_and_xor() {
        assert_eq!(rop2(ROP2_COPYPEN, 0x0012_3456, 0x00ff_ffff), 0x0012_3456);
        assert_eq!(rop2(ROP2_XORPEN, 0x00f0_f0f0, 0x00ff_0000), 0x000f_f0f0);
    }

    #[test]
    fn test_rop2_not_dest() {
        // Code 6 is !D regardless of the pen.
        assert_eq!(rop2(6, 0x1234, 0x00ff_00ff) & 0x00ff_ffff, !0x00ff_00ffu32 & 0x00ff_ffff);
    }
}
