#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // One seed per magic number
    fs::write(format!("{dir}/p1_3x2.pbm"), b"P1\n3 2\n1 0 1\n0 1 1\n").unwrap();
    fs::write(format!("{dir}/p2_2x1.pgm"), b"P2\n# comment\n2 1\n100\n50 100\n").unwrap();
    fs::write(format!("{dir}/p3_1x1.ppm"), b"P3 1 1 15\n15 7 0\n").unwrap();
    fs::write(format!("{dir}/p4_2x2.pbm"), b"P4\n2 2\n\x01\x00\x00\x01").unwrap();
    fs::write(format!("{dir}/p5_3x2.pgm"), b"P5\n3 2\n255\n\x00\x40\x80\xc0\xff\x64").unwrap();
    fs::write(format!("{dir}/p6_2x2.ppm"), b"P6\n2 2\n200\n\xff\x00\x00\x00\xff\x00\x00\x00\xff\x80\x80\x80").unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/just_p6.bin"), b"P6").unwrap();
    fs::write(format!("{dir}/comment_eof.bin"), b"P5\n# never ends").unwrap();
    fs::write(format!("{dir}/short_raster.bin"), b"P5 4 4 255\n\x00").unwrap();
    fs::write(format!("{dir}/maxval_300.bin"), b"P2 1 1 300\n299\n").unwrap();
    fs::write(format!("{dir}/huge_extent.bin"), b"P5 4294967295 4294967295 255\n\x00").unwrap();
    fs::write(format!("{dir}/large_extent.bin"), b"P6 20000 20000 255\n\x01\x02\x03").unwrap();

    println!("Generated seed corpus in {dir}/");
}
