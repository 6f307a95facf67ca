use afl::fuzz;
use finval::{
    normalize, parse_bban, parse_iban, parse_payment_reference, parse_vat, validate_bban,
    validate_iban, validate_payment_reference, validate_vat, ReferenceFormat,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[cfg(not(feature = "manual_test"))]
fn main() {
    fuzz!(|data: &[u8]| {
        run_raw_fuzz(data);
    });
}

#[cfg(feature = "manual_test")]
fn main() {
    use std::io::{stdin, Read};

    let mut input = vec![];
    stdin().read_to_end(&mut input).unwrap();
    run_raw_fuzz(&input);
}

fn split_bytes_once(input: &[u8]) -> Option<(&[u8], &[u8])> {
    let i = input.iter().position(|b| *b == b',')?;
    Some((&input[0..i], &input[i + 1..]))
}

fn run_raw_fuzz(bytes: &[u8]) -> Option<()> {
    let (input, rand_seed) = split_bytes_once(bytes)?;
    let input_str = std::str::from_utf8(input).ok()?;

    let mut rng_seed: u64 = 0;
    for byte in rand_seed.iter().take(8) {
        rng_seed <<= 8;
        rng_seed += *byte as u64;
    }

    let rng = StdRng::seed_from_u64(rng_seed);
    run_fuzz(input_str, rng);

    Some(())
}

fn gen_reference_format(rng: &mut StdRng) -> Option<ReferenceFormat> {
    match rng.gen_range::<u8, _>(0..4) {
        0 => None,
        1 => Some(ReferenceFormat::Rf),
        2 => Some(ReferenceFormat::Finnish),
        _ => Some(ReferenceFormat::NorwegianKid),
    }
}

fn gen_country(rng: &mut StdRng) -> String {
    let letters = b"ABDEFGIKLNOPRST";
    (0..2)
        .map(|_| letters[rng.gen_range(0..letters.len())] as char)
        .collect()
}

fn run_fuzz(input: &str, mut rng: StdRng) {
    let format = gen_reference_format(&mut rng);
    let country = gen_country(&mut rng);

    #[cfg(feature = "manual_test")]
    {
        println!("Input: {:?}", input);
        println!("Reference format: {:?}", format);
        println!("BBAN country: {:?}", country);
    }

    let canonical = normalize(input);
    assert_eq!(normalize(&canonical), canonical);

    // none of these may panic, and parse must succeed exactly when validate does
    assert_eq!(
        parse_iban(input).is_some(),
        validate_iban(input).is_valid()
    );
    assert_eq!(
        parse_bban(&country, input).is_some(),
        validate_bban(&country, input).is_valid()
    );
    assert_eq!(parse_vat(input).is_some(), validate_vat(input).is_valid());
    assert_eq!(
        parse_payment_reference(input, format).is_some(),
        validate_payment_reference(input, format).is_valid()
    );
}
