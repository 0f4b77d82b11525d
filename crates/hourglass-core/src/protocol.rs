//! The delayed-unlock state machine.
//!
//! ```text
//! setup ──► temp_begin ──► temp_fast_copy ──► temp_unlock_begin ──┐
//!   │                                                             ├──► unlock_finish
//!   └───────────────────────► unlock_begin ───────────────────────┘
//! ```
//!
//! The server side of every transition is a pure function of the request,
//! the server keys, and the environment's clock and RNG. Nothing is stored
//! between calls: each stage re-derives the proof issued by the previous
//! stage and compares it with what the client presented. Knowledge of a
//! valid prior proof plus the passage of real time is the only state.

use hourglass_crypto::NONCE_SIZE;

use crate::{
    delay::{DEFAULT_DELAYS, DelaySpec, is_out_of_range},
    env::Environment,
    error::{ProofKind, ProtocolError},
    keys::ServerKeys,
    messages::{
        FastCopy, SealRequest, Sealed, SealedPayload, SetupEntry, SetupRequest, TempBegin,
        TempBeginRequest, TempFastCopyRequest, TempUnlockBeginRequest, UnlockBeginRequest,
        UnlockFinishRequest, UnlockWindow,
    },
    release::{ReleaseMode, ReleasedSecret},
    salt::generate_salt,
    tokens::{
        FIELD_SEPARATOR, fast_copy_proof, format_minutes, minute_bucket, setup_token,
        temp_proof, tokens_match, window_proof,
    },
};

/// One minute in milliseconds.
pub const MINUTE_MS: u64 = 60_000;

/// Number of minute buckets tried when verifying a fast copy proof: the
/// current minute and the four before it.
pub const FAST_COPY_BUCKETS: u64 = 5;

/// Most delays a single `setup` call may request.
pub const MAX_SETUP_DELAYS: usize = 32;

const MAX_SALT_LEN: usize = 64;
const MAX_DELAY_LEN: usize = 32;
const MAX_MINUTES_DIGITS: usize = 10;
const MAX_SEALED_LEN: usize = 16 * 1024;
const MAX_PASSWORD_LEN: usize = 4 * 1024;

/// Stateless delayed-unlock protocol.
///
/// Holds only read-only key material and the environment. Safe to share
/// across threads; concurrent calls never interact.
#[derive(Debug, Clone)]
pub struct Protocol<E: Environment> {
    env: E,
    keys: ServerKeys,
}

impl<E: Environment> Protocol<E> {
    /// Create a protocol instance over `env` with the given server keys.
    pub fn new(env: E, keys: ServerKeys) -> Self {
        Self { env, keys }
    }

    /// The environment supplying time and randomness.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Issue a fresh salt and setup token for each requested delay.
    pub fn setup(&self, request: &SetupRequest) -> Result<Vec<SetupEntry>, ProtocolError> {
        let delays: Vec<&str> = match &request.delays {
            Some(delays) if !delays.is_empty() => delays.iter().map(String::as_str).collect(),
            _ => DEFAULT_DELAYS.to_vec(),
        };
        if delays.len() > MAX_SETUP_DELAYS {
            return Err(ProtocolError::malformed(format!(
                "at most {MAX_SETUP_DELAYS} delays per setup, got {}",
                delays.len()
            )));
        }

        delays
            .into_iter()
            .map(|raw| {
                let delay = validate_delay(raw)?;
                let salt = generate_salt(&self.env);
                let proof = setup_token(self.keys.mac(), &salt, delay.seconds());
                tracing::trace!(%salt, delay = raw, "issued setup token");
                Ok(SetupEntry { name: raw.to_string(), salt, proof })
            })
            .collect()
    }

    /// Seal a secret together with the salt it is bound to.
    pub fn seal(&self, request: &SealRequest) -> Result<Sealed, ProtocolError> {
        validate_salt(&request.salt)?;
        if request.password.is_empty() {
            return Err(ProtocolError::malformed("password is empty"));
        }
        if request.password.len() > MAX_PASSWORD_LEN {
            return Err(ProtocolError::malformed("password too long"));
        }

        let payload =
            SealedPayload { password: request.password.clone(), salt: request.salt.clone() };
        let plaintext = serde_json::to_vec(&payload)
            .map_err(|e| ProtocolError::malformed(format!("unserializable secret: {e}")))?;

        let mut nonce = [0u8; NONCE_SIZE];
        self.env.random_bytes(&mut nonce);

        Ok(Sealed { sealed: self.keys.sealer().seal(&plaintext, nonce) })
    }

    /// Validate a setup token and start the clock.
    pub fn temp_begin(&self, request: &TempBeginRequest) -> Result<TempBegin, ProtocolError> {
        validate_salt(&request.salt)?;
        let delay = validate_delay(&request.delay)?;
        self.check_setup_token(&request.salt, &delay, &request.proof)?;

        let create_time = self.env.now_millis();
        let temp_proof = temp_proof(self.keys.mac(), &request.salt, delay.raw(), create_time);

        Ok(TempBegin { create_time, temp_proof })
    }

    /// Validate a temp begin proof and issue a short proof of minutes
    /// elapsed.
    pub fn temp_fast_copy(
        &self,
        request: &TempFastCopyRequest,
    ) -> Result<FastCopy, ProtocolError> {
        validate_salt(&request.salt)?;
        let delay = validate_delay(&request.delay)?;

        let expected =
            temp_proof(self.keys.mac(), &request.salt, delay.raw(), request.create_time);
        if !tokens_match(&expected, &request.temp_proof) {
            tracing::debug!(salt = %request.salt, "temp begin proof mismatch");
            return Err(ProtocolError::ProofValidation { proof: ProofKind::TempBegin });
        }

        let now = self.env.now_millis();
        let minutes_elapsed = format_minutes(now.saturating_sub(request.create_time) / MINUTE_MS);
        let fast_proof = fast_copy_proof(
            self.keys.mac(),
            delay.raw(),
            &request.salt,
            &minutes_elapsed,
            &minute_bucket(now),
        );

        Ok(FastCopy { minutes_elapsed, fast_proof })
    }

    /// Validate a fast copy proof and open an unlock window after the
    /// remaining delay.
    pub fn temp_unlock_begin(
        &self,
        request: &TempUnlockBeginRequest,
    ) -> Result<UnlockWindow, ProtocolError> {
        validate_salt(&request.salt)?;
        let delay = validate_delay(&request.delay)?;
        let minutes_elapsed = parse_minutes(&request.minutes_elapsed)?;
        validate_sealed(&request.sealed)?;

        let now = self.env.now_millis();

        // The proof was issued in one of the last few minute buckets. Walk
        // back one minute per iteration; every bucket is checked so the
        // match position does not affect timing.
        let mut matched = false;
        let mut trial = now;
        for _ in 0..FAST_COPY_BUCKETS {
            let expected = fast_copy_proof(
                self.keys.mac(),
                delay.raw(),
                &request.salt,
                &request.minutes_elapsed,
                &minute_bucket(trial),
            );
            matched |= tokens_match(&expected, &request.fast_proof);
            trial = trial.saturating_sub(MINUTE_MS);
        }
        if !matched {
            tracing::debug!(salt = %request.salt, "fast copy proof mismatch");
            return Err(ProtocolError::ProofValidation { proof: ProofKind::FastCopy });
        }

        let minutes_to_wait = delay.minutes().saturating_sub(minutes_elapsed).max(1);
        self.issue_window(
            &request.salt,
            now,
            minutes_to_wait,
            request.duration_minutes,
            &request.sealed,
        )
    }

    /// Validate a setup token directly and open an unlock window after the
    /// full delay plus an optional offset.
    pub fn unlock_begin(
        &self,
        request: &UnlockBeginRequest,
    ) -> Result<UnlockWindow, ProtocolError> {
        validate_salt(&request.salt)?;
        let delay = validate_delay(&request.delay)?;
        validate_sealed(&request.sealed)?;
        self.check_setup_token(&request.salt, &delay, &request.proof)?;

        let now = self.env.now_millis();
        let minutes_to_wait = delay
            .minutes()
            .checked_add(request.offset_minutes)
            .ok_or_else(|| ProtocolError::malformed("offset too large"))?;

        self.issue_window(
            &request.salt,
            now,
            minutes_to_wait,
            request.duration_minutes,
            &request.sealed,
        )
    }

    /// Validate a window proof and the current time, then open the sealed
    /// secret and release it.
    pub fn unlock_finish(
        &self,
        request: &UnlockFinishRequest,
    ) -> Result<ReleasedSecret, ProtocolError> {
        validate_salt(&request.salt)?;
        validate_sealed(&request.sealed)?;
        let mode = ReleaseMode::from_wire(request.mode.as_deref(), request.challenge.as_deref())?;

        let expected = window_proof(
            self.keys.mac(),
            &request.salt,
            request.window_start,
            request.window_end,
            &request.sealed,
        );
        if !tokens_match(&expected, &request.proof) {
            tracing::debug!(salt = %request.salt, "unlock window proof mismatch");
            return Err(ProtocolError::ProofValidation { proof: ProofKind::UnlockWindow });
        }

        let now = self.env.now_millis();
        if now < request.window_start || now > request.window_end {
            tracing::debug!(
                salt = %request.salt,
                now,
                window_start = request.window_start,
                window_end = request.window_end,
                "unlock window not open"
            );
            return Err(ProtocolError::WindowNotYetOpen {
                now,
                window_start: request.window_start,
                window_end: request.window_end,
            });
        }

        let plaintext = self.keys.sealer().unseal(&request.sealed)?;
        let payload: SealedPayload = serde_json::from_slice(&plaintext).map_err(|e| {
            ProtocolError::malformed(format!("sealed payload is not a secret: {e}"))
        })?;

        if !tokens_match(&payload.salt, &request.salt) {
            tracing::debug!(salt = %request.salt, "sealed secret bound to another salt");
            return Err(ProtocolError::SaltBinding);
        }

        tracing::trace!(salt = %request.salt, mode = mode.name(), "released secret");
        Ok(mode.release(&payload.password, request.window_end, now, self.keys.release_key()))
    }

    fn check_setup_token(
        &self,
        salt: &str,
        delay: &DelaySpec,
        presented: &str,
    ) -> Result<(), ProtocolError> {
        let expected = setup_token(self.keys.mac(), salt, delay.seconds());
        if tokens_match(&expected, presented) {
            Ok(())
        } else {
            tracing::debug!(%salt, delay = delay.raw(), "setup token mismatch");
            Err(ProtocolError::TokenValidation)
        }
    }

    fn issue_window(
        &self,
        salt: &str,
        now: u64,
        minutes_to_wait: u64,
        duration_minutes: u64,
        sealed: &str,
    ) -> Result<UnlockWindow, ProtocolError> {
        if duration_minutes == 0 {
            return Err(ProtocolError::malformed("window duration must be at least one minute"));
        }

        let window_start = minutes_to_wait
            .checked_mul(MINUTE_MS)
            .and_then(|wait| now.checked_add(wait))
            .ok_or_else(|| ProtocolError::malformed("window start out of range"))?;
        let window_end = duration_minutes
            .checked_mul(MINUTE_MS)
            .and_then(|length| window_start.checked_add(length))
            .ok_or_else(|| ProtocolError::malformed("window end out of range"))?;

        let window_proof = window_proof(self.keys.mac(), salt, window_start, window_end, sealed);
        tracing::trace!(%salt, window_start, window_end, "issued unlock window");

        Ok(UnlockWindow { window_start, window_end, window_proof })
    }
}

/// Salts are server-issued hex strings; accept a slightly wider alphabet
/// but never the field separator.
fn validate_salt(salt: &str) -> Result<(), ProtocolError> {
    if salt.is_empty() {
        return Err(ProtocolError::malformed("salt is empty"));
    }
    if salt.len() > MAX_SALT_LEN {
        return Err(ProtocolError::malformed("salt too long"));
    }
    if !salt.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ProtocolError::malformed("salt contains invalid characters"));
    }
    Ok(())
}

fn validate_delay(raw: &str) -> Result<DelaySpec, ProtocolError> {
    if raw.trim().is_empty() {
        return Err(ProtocolError::malformed("delay is empty"));
    }
    if raw.len() > MAX_DELAY_LEN {
        return Err(ProtocolError::malformed("delay too long"));
    }
    if raw.contains(FIELD_SEPARATOR) || raw.chars().any(char::is_control) {
        return Err(ProtocolError::malformed("delay contains invalid characters"));
    }
    if is_out_of_range(raw) {
        return Err(ProtocolError::malformed("delay out of range"));
    }
    Ok(DelaySpec::new(raw))
}

fn validate_sealed(sealed: &str) -> Result<(), ProtocolError> {
    if sealed.is_empty() {
        return Err(ProtocolError::malformed("sealed secret is empty"));
    }
    if sealed.len() > MAX_SEALED_LEN {
        return Err(ProtocolError::malformed("sealed secret too long"));
    }
    if sealed.contains(FIELD_SEPARATOR) {
        return Err(ProtocolError::malformed("sealed secret contains invalid characters"));
    }
    Ok(())
}

fn parse_minutes(minutes: &str) -> Result<u64, ProtocolError> {
    if minutes.is_empty()
        || minutes.len() > MAX_MINUTES_DIGITS
        || !minutes.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(ProtocolError::malformed("minutes elapsed must be 1 to 10 digits"));
    }
    minutes.parse().map_err(|_| ProtocolError::malformed("minutes elapsed out of range"))
}
