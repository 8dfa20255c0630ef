//! # Prime Cache
//!
//! Read-mostly primality table shared by every pattern computation.
//!
//! - Values up to `sieve_limit` are answered from a bit-packed sieve built
//!   once at construction.
//! - Larger values fall back to trial division and are memoised. Lookups
//!   share a read lock; misses are computed outside the lock and inserted in
//!   one write-lock batch, so writers are serialized and readers never wait
//!   on the arithmetic.
//! - [`PrimeCache::evict_memo`] is the memory-pressure hook.

use bitvec::prelude::*;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Default sieve bound.
pub const DEFAULT_SIEVE_LIMIT: u64 = 100_000;

/// Shared primality cache.
pub struct PrimeCache {
    sieve: BitVec<u8, Lsb0>,
    sieve_limit: u64,
    small_primes: Vec<u64>,
    memo: RwLock<HashMap<u64, bool>>,
}

impl PrimeCache {
    /// Build the sieve for `0..=sieve_limit`.
    pub fn new(sieve_limit: u64) -> Self {
        let limit = sieve_limit.max(2) as usize;
        let mut sieve = bitvec![u8, Lsb0; 1; limit + 1];
        sieve.set(0, false);
        sieve.set(1, false);

        let mut i = 2usize;
        while i * i <= limit {
            if sieve[i] {
                let mut j = i * i;
                while j <= limit {
                    sieve.set(j, false);
                    j += i;
                }
            }
            i += 1;
        }

        let small_primes = sieve.iter_ones().map(|p| p as u64).collect::<Vec<_>>();
        tracing::debug!(limit, primes = small_primes.len(), "Prime sieve built");

        Self {
            sieve,
            sieve_limit: limit as u64,
            small_primes,
            memo: RwLock::new(HashMap::new()),
        }
    }

    pub fn sieve_limit(&self) -> u64 {
        self.sieve_limit
    }

    /// Primality of `n`, consulting the sieve then the memo.
    pub fn is_prime(&self, n: u64) -> bool {
        if n <= self.sieve_limit {
            return self.sieve[n as usize];
        }
        if let Some(&known) = self.memo.read().get(&n) {
            return known;
        }
        let value = self.trial_division(n);
        self.memo.write().insert(n, value);
        value
    }

    /// All primes in `[start, end)`, ascending.
    pub fn primes_in_range(&self, start: u64, end: u64) -> Vec<u64> {
        let mut primes = Vec::new();
        let mut misses = Vec::new();

        {
            let memo = self.memo.read();
            for n in start..end {
                if n <= self.sieve_limit {
                    if self.sieve[n as usize] {
                        primes.push(n);
                    }
                    continue;
                }
                match memo.get(&n) {
                    Some(true) => primes.push(n),
                    Some(false) => {}
                    None => misses.push(n),
                }
            }
        }

        if !misses.is_empty() {
            let computed: Vec<(u64, bool)> =
                misses.iter().map(|&n| (n, self.trial_division(n))).collect();
            primes.extend(computed.iter().filter(|(_, p)| *p).map(|(n, _)| *n));
            self.memo.write().extend(computed);
            primes.sort_unstable();
        }

        primes
    }

    /// Number of memoised entries beyond the sieve.
    pub fn memo_len(&self) -> usize {
        self.memo.read().len()
    }

    /// Drop every memoised entry. Returns how many were evicted.
    pub fn evict_memo(&self) -> usize {
        let mut memo = self.memo.write();
        let evicted = memo.len();
        memo.clear();
        memo.shrink_to_fit();
        evicted
    }

    fn trial_division(&self, n: u64) -> bool {
        if n < 2 {
            return false;
        }
        for &p in &self.small_primes {
            if p * p > n {
                return true;
            }
            if n % p == 0 {
                return n == p;
            }
        }
        // Sieve exhausted below sqrt(n); continue on odd divisors.
        let mut d = (self.sieve_limit + 1) | 1;
        while d * d <= n {
            if n % d == 0 {
                return false;
            }
            d += 2;
        }
        true
    }
}

impl Default for PrimeCache {
    fn default() -> Self {
        Self::new(DEFAULT_SIEVE_LIMIT)
    }
}

/// Reference trial division, independent of any cache.
pub fn is_prime_trial(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
