use criterion::{criterion_group, criterion_main, Criterion, black_box};

use ds_common::{dynarr, collections::*};

fn dynarr_new(c: &mut Criterion) {
    c.bench_function("DynArr::new", |b| b.iter(|| {
        DynArr::<u32>::new()
    }));
    c.bench_function("Vec::new", |b| b.iter(|| {
        Vec::<u32>::new()
    }));
    c.bench_function("DynArr::with_capacity(64)", |b| b.iter(|| {
        DynArr::<u32>::with_capacity(64)
    }));
    c.bench_function("Vec::with_capacity(64)", |b| b.iter(|| {
        Vec::<u32>::with_capacity(64)
    }));
}

fn dynarr_reserve(c: &mut Criterion) {
    c.bench_function("DynArr::reserve(32)", |b| b.iter(|| {
        let mut arr = DynArr::<u32>::new();
        _ = arr.reserve(32);
        arr
    }));
    c.bench_function("Vec::reserve(32)", |b| b.iter(|| {
        let mut arr = Vec::<u32>::new();
        arr.reserve(32);
        arr
    }));
}

fn dynarr_push(c: &mut Criterion) {
    c.bench_function("DynArr::push(100) no reserve", |b| b.iter(|| {
        let mut arr = DynArr::<u32>::new();
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
    c.bench_function("DynArr::push(100) reserve", |b| b.iter(|| {
        let mut arr = DynArr::<u32>::new();
        _ = arr.reserve(100);
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
    c.bench_function("DynArr<Pow2>::push(100) no reserve", |b| b.iter(|| {
        let mut arr = DynArr::<u32, Pow2ReserveStrategy>::new();
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));

    c.bench_function("Vec::push(100) no reserve", |b| b.iter(|| {
        let mut arr = Vec::<u32>::new();
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
    c.bench_function("Vec::push(100) reserve", |b| b.iter(|| {
        let mut arr = Vec::<u32>::new();
        arr.reserve(100);
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
}

fn dynarr_index(c: &mut Criterion) {
    let arr = dynarr![5u32; 100];
    c.bench_function("DynArr::index(100)", |b| b.iter(|| {
        for i in 0..100 {
            black_box(arr[i]);
        }
    }));
    c.bench_function("DynArr::at(100)", |b| b.iter(|| {
        for i in 0..100 {
            _ = black_box(arr.at(i));
        }
    }));
    c.bench_function("Cursor::walk(100)", |b| b.iter(|| {
        let end = arr.end();
        let mut it = arr.begin();
        while it != end {
            black_box(*it);
            it.inc();
        }
    }));

    let vbuf = vec![5u32; 100];
    c.bench_function("Vec::index(100)", |b| b.iter(|| {
        for i in 0..100 {
            black_box(vbuf[i]);
        }
    }));
}

fn dynarr_clone(c: &mut Criterion) {
    let arr: DynArr<u32> = (0..1000).collect();
    c.bench_function("DynArr::clone(1000)", |b| b.iter(|| {
        arr.clone()
    }));

    let mut dst = DynArr::<u32>::with_capacity(1000);
    c.bench_function("DynArr::assign_from(1000)", |b| b.iter(|| {
        dst.assign_from(&arr);
        black_box(dst.len());
    }));

    let vbuf: Vec<u32> = (0..1000).collect();
    c.bench_function("Vec::clone(1000)", |b| b.iter(|| {
        vbuf.clone()
    }));
}

criterion_group!(dynarr,
    dynarr_new,
    dynarr_reserve,
    dynarr_push,
    dynarr_index,
    dynarr_clone
);
criterion_main!(dynarr);
