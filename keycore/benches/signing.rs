use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keycore::{
    protect, sign, unprotect, verify, CurveOption, EcPrivateKey, HashAlgorithm, Key, PrivateKey, RsaPrivateKey,
    SaltLength, SignOptions,
};

fn sign_and_verify(key: &PrivateKey, options: &SignOptions, n: usize) -> anyhow::Result<bool> {
    let digest = options.hash().digest(vec![0u8; n]);
    let signature = sign(key, &digest, Some(options))?;
    Ok(verify(&key.public_key(), &signature, &digest, Some(options))?)
}

fn criterion_benchmark(c: &mut Criterion) {
    for (curve, hash) in [
        (CurveOption::P256, HashAlgorithm::Sha256),
        (CurveOption::P384, HashAlgorithm::Sha384),
        (CurveOption::P521, HashAlgorithm::Sha512),
    ] {
        let key: PrivateKey = EcPrivateKey::generate(curve).unwrap().into();
        let options = SignOptions::Ecdsa { hash };
        c.bench_function(&format!("ecdsa {} 1024", curve), |b| {
            b.iter(|| sign_and_verify(black_box(&key), &options, 1024))
        });
    }

    let rsa: PrivateKey = RsaPrivateKey::generate(2048).unwrap().into();
    let pss = SignOptions::RsaPss {
        hash: HashAlgorithm::Sha256,
        salt: SaltLength::EqualsHash,
    };
    c.bench_function("rsa-pss 2048 1024", |b| {
        b.iter(|| sign_and_verify(black_box(&rsa), &pss, 1024))
    });

    let secret = [7u8; 66];
    let aes_key = [1u8; 32];
    c.bench_function("protect+unprotect 66", |b| {
        b.iter(|| {
            let encrypted = protect(black_box(&secret), &aes_key).unwrap();
            unprotect(encrypted.as_ref(), &aes_key).unwrap()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
