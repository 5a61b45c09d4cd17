use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

use sealbox::PASSPHRASE_VAR;

pub fn read_passphrase() -> Result<Zeroizing<String>> {
    //  Environment Variable
    //  SEALBOX_PASSPHRASE="..." sealbox get sessions/alice
    if let Ok(pw) = std::env::var(PASSPHRASE_VAR) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    //  stdin (Pipeline)
    //  printf "%s" "$SEALBOX_PASSPHRASE" | sealbox get sessions/alice
    if !io::stdin().is_terminal() {
        let stdin = io::stdin();
        let mut buf = Zeroizing::new(String::new());
        stdin.lock().read_line(&mut buf)?;
        trim_newline(&mut buf);

        if !buf.is_empty() {
            return Ok(buf);
        }
    }

    //  Interactive (TTY)
    if io::stdin().is_terminal() {
        let pw = rpassword::prompt_password("Passphrase: ")?;
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    bail!("No passphrase provided")
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
