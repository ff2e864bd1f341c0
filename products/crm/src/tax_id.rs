//! Check-digit validation for Brazilian CPF (individuals) and CNPJ
//! (companies) numbers. Punctuation is ignored.

use crate::format::digits_only;

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

pub fn is_valid_cpf(raw: &str) -> bool {
    let Some(digits) = parse_digits(raw, 11) else {
        return false;
    };
    (9..11).all(|position| {
        let sum: u32 = digits[..position]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (position as u32 + 1 - i as u32))
            .sum();
        (sum * 10) % 11 % 10 == digits[position]
    })
}

pub fn is_valid_cnpj(raw: &str) -> bool {
    let Some(digits) = parse_digits(raw, 14) else {
        return false;
    };
    cnpj_digit(&digits, &CNPJ_FIRST_WEIGHTS) == digits[12]
        && cnpj_digit(&digits, &CNPJ_SECOND_WEIGHTS) == digits[13]
}

fn cnpj_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let digit = 11 - sum % 11;
    if digit > 9 { 0 } else { digit }
}

// Exact length, and not a run of one repeated digit.
fn parse_digits(raw: &str, len: usize) -> Option<Vec<u32>> {
    let digits: Vec<u32> = digits_only(raw)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();
    if digits.len() != len || digits.iter().all(|d| *d == digits[0]) {
        return None;
    }
    Some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpf() {
        assert!(is_valid_cpf("529.982.247-25"));
        assert!(is_valid_cpf("52998224725"));
        assert!(!is_valid_cpf("529.982.247-26"));
        assert!(!is_valid_cpf("111.111.111-11"));
        assert!(!is_valid_cpf("1234"));
    }

    #[test]
    fn cnpj() {
        assert!(is_valid_cnpj("11.222.333/0001-81"));
        assert!(!is_valid_cnpj("11.222.333/0001-82"));
        assert!(!is_valid_cnpj("00.000.000/0000-00"));
        assert!(!is_valid_cnpj("11222333"));
    }
}
