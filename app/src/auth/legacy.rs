//! Werkzeug password hashes (`method$salt$hex`), as written to the users file by the previous
//! service. Only verification is supported; new hashes are always Argon2.

use argon2::password_hash::Output;
use pbkdf2::pbkdf2_hmac;
use sha2::{Sha256, Sha512};

const SCRYPT_DEFAULT_N: u64 = 1 << 15;
const SCRYPT_DEFAULT_R: u32 = 8;
const SCRYPT_DEFAULT_P: u32 = 1;
const SCRYPT_LEN: usize = 64;

/// Returns `None` if `hash` is not a werkzeug hash this module understands.
pub(super) fn verify(hash: &str, password: &str) -> Option<bool> {
    let mut parts = hash.splitn(3, '$');
    let (method, salt, expected) = (parts.next()?, parts.next()?, parts.next()?);
    let expected = Output::new(&hex::decode(expected).ok()?).ok()?;

    let mut args = method.split(':');
    let derived = match args.next()? {
        "pbkdf2" => {
            let digest = args.next().unwrap_or("sha256");
            let rounds: u32 = args.next()?.parse().ok()?;
            pbkdf2(digest, password, salt, rounds)?
        }
        "scrypt" => {
            let n = parse_or(args.next(), SCRYPT_DEFAULT_N)?;
            let r = parse_or(args.next(), SCRYPT_DEFAULT_R)?;
            let p = parse_or(args.next(), SCRYPT_DEFAULT_P)?;
            scrypt(password, salt, n, r, p)?
        }
        _ => return None,
    };
    Some(Output::new(&derived).ok()? == expected)
}

fn pbkdf2(digest: &str, password: &str, salt: &str, rounds: u32) -> Option<Vec<u8>> {
    match digest {
        "sha256" => {
            let mut out = vec![0; 32];
            pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), rounds, &mut out);
            Some(out)
        }
        "sha512" => {
            let mut out = vec![0; 64];
            pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), rounds, &mut out);
            Some(out)
        }
        _ => None,
    }
}

fn scrypt(password: &str, salt: &str, n: u64, r: u32, p: u32) -> Option<Vec<u8>> {
    if !n.is_power_of_two() || n < 2 {
        return None;
    }
    let params = scrypt::Params::new(n.trailing_zeros() as u8, r, p, SCRYPT_LEN).ok()?;
    let mut out = vec![0; SCRYPT_LEN];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut out).ok()?;
    Some(out)
}

fn parse_or<T: std::str::FromStr>(arg: Option<&str>, default: T) -> Option<T> {
    match arg {
        Some(arg) => arg.parse().ok(),
        None => Some(default),
    }
}
