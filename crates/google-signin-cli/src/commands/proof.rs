use google_signin_auth::appsecret_proof;

use crate::cli::ProofArgs;

pub fn run(app_secret: &str, args: &ProofArgs) {
    println!("{}", appsecret_proof(app_secret, &args.access_token));
}
